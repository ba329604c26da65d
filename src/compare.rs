//! Comparison orchestration.
//!
//! This module is the single entry point every view and export goes through:
//! schema validation, threshold clamping, diff marking, and summaries. Screen,
//! CSV, JSON and print output all render a [`ComparisonResult`] produced here
//! with the parameters of the current request.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::load::{load_table, LoadError};
use crate::mark::{mark, summarize};
use crate::models::*;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error(
        "The spreadsheets have different columns ({} vs {}). \
         Generate both from the same template before comparing.",
        .header_a.join("|"),
        .header_b.join("|")
    )]
    SchemaMismatch {
        header_a: Vec<String>,
        header_b: Vec<String>,
    },
    #[error("Failed to read the spreadsheets: {0}")]
    Load(#[from] LoadError),
}

/// Compare two in-memory tables.
///
/// Headers must match in content and order; otherwise nothing is marked and
/// [`CompareError::SchemaMismatch`] is returned. Two tables without any
/// header compare as an empty result.
pub fn compare_tables(
    table_a: &Table,
    table_b: &Table,
    params: &ComparisonParams,
) -> Result<ComparisonResult, CompareError> {
    let header_a = table_a.header().unwrap_or(&[]);
    let header_b = table_b.header().unwrap_or(&[]);

    if header_a != header_b {
        return Err(CompareError::SchemaMismatch {
            header_a: header_a.to_vec(),
            header_b: header_b.to_vec(),
        });
    }

    if header_a.is_empty() {
        warn!("neither table has a header row; comparing zero columns");
    }

    let threshold = params.effective_threshold();
    if threshold != params.threshold {
        warn!(
            requested = params.threshold,
            threshold, "threshold out of range, clamped"
        );
    }

    debug!(
        rows_a = table_a.row_count(),
        rows_b = table_b.row_count(),
        columns = header_a.len(),
        threshold,
        metric = %params.metric,
        "marking differences"
    );

    let (annotated_a, annotated_b) = mark(table_a, table_b, threshold, params.metric);

    let mut result = ComparisonResult {
        version: env!("CARGO_PKG_VERSION").to_string(),
        threshold,
        metric: params.metric,
        columns: header_a.to_vec(),
        table_a: annotated_a,
        table_b: annotated_b,
        summary: ComparisonSummary::default(),
    };

    result.summary = ComparisonSummary {
        table_a: summarize(&result.table_a),
        table_b: summarize(&result.table_b),
        differing_positions: differing_positions(&result).count(),
    };

    info!(
        rows_with_diff = result.summary.table_a.rows_with_diff,
        cells_different = result.summary.table_a.cells_different,
        differing_positions = result.summary.differing_positions,
        "comparison complete"
    );

    Ok(result)
}

/// Load two workbooks and compare them.
///
/// Both files are loaded before anything is compared; a missing or unreadable
/// file aborts the whole comparison.
pub fn compare_files(
    path_a: &Path,
    path_b: &Path,
    sheet_a: Option<&str>,
    sheet_b: Option<&str>,
    params: &ComparisonParams,
) -> Result<ComparisonResult, CompareError> {
    let table_a = load_table(path_a, sheet_a)?;
    let table_b = load_table(path_b, sheet_b)?;

    compare_tables(&table_a, &table_b, params)
}

/// Differing-cell records for CSV export, in row then column order.
///
/// A position is included when at least one side is Different; a side that
/// has no cell there contributes an empty value.
pub fn diff_records(result: &ComparisonResult) -> Vec<DiffRecord> {
    differing_positions(result)
        .map(|(row, col)| DiffRecord {
            column: result.columns[col].clone(),
            value_a: cell_value(&result.table_a, row, col),
            value_b: cell_value(&result.table_b, row, col),
            row,
        })
        .collect()
}

fn cell_value(table: &AnnotatedTable, row: usize, col: ColumnKey) -> String {
    table
        .cell(row, col)
        .map(|cell| cell.value().to_string())
        .unwrap_or_default()
}

/// `(row_number, column_key)` of every position where either side differs.
fn differing_positions(result: &ComparisonResult) -> impl Iterator<Item = (usize, ColumnKey)> + '_ {
    let columns = result.columns.len();

    (2..=result.last_row())
        .flat_map(move |row| (0..columns).map(move |col| (row, col)))
        .filter(move |&(row, col)| {
            let is_diff = |table: &AnnotatedTable| {
                table.cell(row, col).is_some_and(AnnotatedCell::is_different)
            };
            is_diff(&result.table_a) || is_diff(&result.table_b)
        })
}

/// Outcome of one pair in a batch run
#[derive(Debug)]
pub struct BatchOutcome {
    pub name: String,
    pub result: Result<ComparisonResult, CompareError>,
}

/// Compare many independent file pairs in parallel.
///
/// Each pair is a separate comparison with no shared state; a failing pair
/// does not affect the others. Outcomes keep the manifest order.
pub fn compare_batch(
    pairs: &[BatchPair],
    params: &ComparisonParams,
    show_progress: bool,
) -> Vec<BatchOutcome> {
    let progress = if show_progress {
        let pb = ProgressBar::new(pairs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let outcomes: Vec<BatchOutcome> = pairs
        .par_iter()
        .map(|pair| {
            let result = compare_files(
                &pair.file_a,
                &pair.file_b,
                pair.sheet_a.as_deref(),
                pair.sheet_b.as_deref(),
                params,
            );

            if let Err(ref e) = result {
                warn!(pair = %pair.label(), error = %e, "comparison failed");
            }
            if let Some(ref pb) = progress {
                pb.inc(1);
            }

            BatchOutcome {
                name: pair.label(),
                result,
            }
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_with_message("Done");
    }

    outcomes
}
