//! Sheet Compare Library
//!
//! Cell-by-cell fuzzy comparison of two spreadsheet tables that share a
//! header. Rows and columns are paired by position, each pair is scored with
//! a similarity metric, and cells scoring below the threshold are tagged as
//! different on whichever side holds a value.
//!
//! # Example
//!
//! ```
//! use sheet_compare::prelude::*;
//!
//! let a: Table = vec![vec!["Nome", "Valor"], vec!["Ana", "100"], vec!["Bia", "200"]]
//!     .into_iter()
//!     .collect();
//! let b: Table = vec![vec!["Nome", "Valor"], vec!["Ana", "100"], vec!["Bia", "250"]]
//!     .into_iter()
//!     .collect();
//!
//! let params = ComparisonParams::default()
//!     .with_threshold(80)
//!     .with_metric(Metric::EditDistance);
//! let result = compare_tables(&a, &b, &params).unwrap();
//!
//! assert_eq!(result.summary.table_a.cells_different, 1);
//! let records = diff_records(&result);
//! assert_eq!(records[0].column, "Valor");
//! assert_eq!(records[0].row, 3);
//! ```
//!
//! # Loading Workbooks
//!
//! ```no_run
//! use sheet_compare::prelude::*;
//! use std::path::Path;
//!
//! let params = ComparisonParams::default();
//! let result = compare_files(
//!     Path::new("a.xlsx"),
//!     Path::new("b.xlsx"),
//!     None,
//!     None,
//!     &params,
//! )
//! .unwrap();
//!
//! print_summary(&result);
//! ```

pub mod compare;
pub mod config;
pub mod load;
pub mod mark;
pub mod models;
pub mod normalize;
pub mod output;
pub mod similarity;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::compare::{
        compare_batch, compare_files, compare_tables, diff_records, BatchOutcome, CompareError,
    };
    pub use crate::config::{load_params, parse_params, ConfigError};
    pub use crate::load::{cell_to_string, load_table, range_to_table, LoadError};
    pub use crate::mark::{column_keys, mark, summarize};
    pub use crate::models::{
        AnnotatedCell, AnnotatedTable, BatchPair, ColumnKey, ComparisonParams, ComparisonResult,
        ComparisonSummary, DiffRecord, DiffSummary, Metric, Table, MAX_THRESHOLD,
    };
    pub use crate::normalize::normalize;
    pub use crate::output::{
        batch_file_name, escape_html, format_record, format_summary_line, print_diffs,
        print_summary, render_print_html, render_side_by_side_html, render_table_pane,
        write_diff_csv, write_diff_csv_file, write_json, write_json_file, write_print_html_file,
        write_side_by_side_html_file, OutputError,
    };
    pub use crate::similarity::{character_overlap, edit_distance_ratio, levenshtein, similarity};
}

// Re-export commonly used types at the crate root
pub use models::{AnnotatedCell, AnnotatedTable, ComparisonParams, ComparisonResult, Metric, Table};
