//! Output formatting for comparison results (HTML side-by-side, print, CSV, JSON).
//!
//! Every renderer takes a finished [`ComparisonResult`]; none of them scores
//! cells or re-reads files, so what is exported is exactly what was compared.

use crate::models::{AnnotatedTable, ComparisonResult, DiffRecord, DiffSummary};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write comparison result as JSON.
pub fn write_json<W: Write>(result: &ComparisonResult, writer: &mut W) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(result)?;
    writer.write_all(json.as_bytes())?;
    Ok(())
}

/// Write comparison result as JSON to a file.
pub fn write_json_file(result: &ComparisonResult, path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_json(result, &mut file)
}

/// Write differing cells as semicolon-separated CSV.
///
/// Every field is double-quoted with embedded quotes doubled; lines end in
/// CRLF so spreadsheet programs open the file directly.
pub fn write_diff_csv<W: Write>(records: &[DiffRecord], writer: &mut W) -> Result<(), OutputError> {
    write!(writer, "Column;Value A;Value B;Row\r\n")?;

    for record in records {
        write!(
            writer,
            "{};{};{};{}\r\n",
            csv_field(&record.column),
            csv_field(&record.value_a),
            csv_field(&record.value_b),
            csv_field(&record.row.to_string()),
        )?;
    }

    Ok(())
}

/// Write differing cells as CSV to a file.
pub fn write_diff_csv_file(records: &[DiffRecord], path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_diff_csv(records, &mut file)
}

fn csv_field(value: &str) -> String {
    // Collapse internal whitespace runs the way the rendered table shows them
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("\"{}\"", collapsed.replace('"', "\"\""))
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// One annotated table as an HTML pane.
///
/// Data cells tagged Different get the `diff-cell` class and their row gets
/// `row-has-diff`. The header row is rendered as-is.
pub fn render_table_pane(table: &AnnotatedTable, columns: &[String], title: &str) -> String {
    if table.header.is_empty() && table.rows.is_empty() {
        return "<p>No data</p>".to_string();
    }

    let mut ths = String::new();
    for label in columns {
        let v = escape_html(label);
        let _ = write!(ths, "<th class=\"sticky-top\" title=\"{v}\">{v}</th>");
    }

    let mut tbody = String::new();
    for (_, row) in table.numbered_rows() {
        let mut tds = String::new();
        let mut row_has_diff = false;

        for col in 0..columns.len() {
            let (value, is_diff) = row
                .get(col)
                .map(|cell| (cell.value(), cell.is_different()))
                .unwrap_or(("", false));
            row_has_diff |= is_diff;

            let v = escape_html(value);
            let cls = if is_diff { " class=\"diff-cell\"" } else { "" };
            let _ = write!(tds, "<td{cls} title=\"{v}\">{v}</td>");
        }

        let tr_class = if row_has_diff { " class=\"row-has-diff\"" } else { "" };
        let _ = write!(tbody, "<tr{tr_class}>{tds}</tr>");
    }

    let title = escape_html(title);
    format!(
        r#"<div class="pane">
  <div class="pane-header"><h5 class="m-0">{title}</h5></div>
  <div class="pane-table" id="pane-{title}">
    <table class="table table-bordered table-sm table-hover mb-0">
      <thead><tr>{ths}</tr></thead>
      <tbody>{tbody}</tbody>
    </table>
  </div>
</div>"#
    )
}

/// Summary line shown above the panes.
pub fn format_summary_line(summary: &DiffSummary) -> String {
    format!(
        "Rows with differences: {} | Different cells: {}",
        summary.rows_with_diff, summary.cells_different
    )
}

/// Self-contained side-by-side view: A on the left, B on the right,
/// with synchronized scrolling.
pub fn render_side_by_side_html(result: &ComparisonResult) -> String {
    let pane_a = render_table_pane(&result.table_a, &result.columns, "A");
    let pane_b = render_table_pane(&result.table_b, &result.columns, "B");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Spreadsheet comparison</title>
    <style>
        :root {{ --navy: #04193b; --grey: #b8b8c4; --light: #efeff4; }}
        body {{ background: var(--light); color: var(--navy); font-family: sans-serif; }}
        .meta {{ margin-bottom: 8px; }}
        .pane-grid {{ display: grid; grid-template-columns: 1fr 1fr; gap: 16px; height: calc(100vh - 120px); min-height: 520px; }}
        .pane {{ display: flex; flex-direction: column; min-width: 0; background: #fff; border: 1px solid var(--grey); border-radius: .5rem; }}
        .pane-header {{ padding: .5rem .75rem; border-bottom: 1px solid var(--grey); background: var(--light); }}
        .pane-table {{ flex: 1; overflow: auto; }}
        .pane-table table {{ width: max-content; border-collapse: separate; }}
        .pane-table th, .pane-table td {{ white-space: nowrap; line-height: 1.25rem; padding: 2px 6px; border: 1px solid var(--grey); }}
        table thead th.sticky-top {{ position: sticky; top: 0; z-index: 2; background: var(--grey); }}
        .diff-cell {{ background: #f8d7da !important; }}
        @media (max-width: 992px) {{ .pane-grid {{ grid-template-columns: 1fr; height: auto; }} }}
    </style>
</head>
<body>
    <div class="meta">Minimum similarity: {threshold}% | Metric: {metric}</div>
    <div class="meta" id="diffCount">{summary}</div>
    <div class="pane-grid">
{pane_a}
{pane_b}
    </div>
    <script>
        const a = document.querySelector('#pane-A');
        const b = document.querySelector('#pane-B');
        if (a && b) {{
            let lock = false;
            function sync(from, to) {{
                if (lock) return;
                lock = true;
                to.scrollTop = from.scrollTop;
                to.scrollLeft = from.scrollLeft;
                lock = false;
            }}
            a.addEventListener('scroll', () => sync(a, b));
            b.addEventListener('scroll', () => sync(b, a));
        }}
    </script>
</body>
</html>"##,
        threshold = result.threshold,
        metric = result.metric,
        summary = escape_html(&format_summary_line(&result.summary.table_a)),
        pane_a = pane_a,
        pane_b = pane_b,
    )
}

/// Print-oriented document (A4 landscape) of the annotated tables.
///
/// Feed it to any HTML-to-PDF renderer to get the PDF export.
pub fn render_print_html(result: &ComparisonResult) -> String {
    let pane_a = render_table_pane(&result.table_a, &result.columns, "A");
    let pane_b = render_table_pane(&result.table_b, &result.columns, "B");

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
  @page {{ size: A4 landscape; margin: 10mm; }}
  body {{ font-family: "DejaVu Sans", Arial, Helvetica, sans-serif; font-size: 11px; color: #04193b; }}
  h2 {{ margin: 0 0 12px 0; }}
  .wrap {{ display: flex; gap: 10px; }}
  .pane {{ border: none; }}
  .pane-header {{ padding: 4px 0; border: none; background: #fff; }}
  .pane-table {{ overflow: visible; }}
  .sticky-top {{ position: static !important; }}
  table {{ border-collapse: collapse; }}
  thead {{ display: table-header-group; }}
  tr {{ page-break-inside: avoid; }}
  th, td {{ border: 1px solid #b8b8c4; padding: 4px 6px; white-space: nowrap; }}
  thead th {{ background: #b8b8c4; }}
  .diff-cell {{ background: #f8d7da; }}
</style>
</head>
<body>
  <h2>Spreadsheet comparison</h2>
  <div style="margin-bottom:8px;">
    Minimum similarity: {threshold}% &nbsp;|&nbsp; Metric: {metric}
  </div>
  <div class="wrap">
{pane_a}
{pane_b}
  </div>
</body>
</html>"##,
        threshold = result.threshold,
        metric = result.metric,
        pane_a = pane_a,
        pane_b = pane_b,
    )
}

/// Write the side-by-side view to a file.
pub fn write_side_by_side_html_file(result: &ComparisonResult, path: &Path) -> Result<(), OutputError> {
    std::fs::write(path, render_side_by_side_html(result))?;
    Ok(())
}

/// Write the print document to a file.
pub fn write_print_html_file(result: &ComparisonResult, path: &Path) -> Result<(), OutputError> {
    std::fs::write(path, render_print_html(result))?;
    Ok(())
}

/// File name for the `index`-th (0-based) pair of a batch run.
///
/// The 1-based manifest position leads the name, so pairs with the same label
/// never share a file. Path separators and other unsafe characters in the
/// label become `_`, and dots inside the label are kept.
pub fn batch_file_name(index: usize, label: &str, extension: &str) -> String {
    let safe: String = label
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_matches('.');
    let safe = if safe.is_empty() { "pair" } else { safe };
    format!("{:03}_{}.{}", index + 1, safe, extension)
}

/// Write a summary report to stdout.
pub fn print_summary(result: &ComparisonResult) {
    println!("\n=== Comparison Summary ===");
    println!("Version: {}", result.version);
    println!();
    println!("Parameters:");
    println!("  Minimum similarity: {}%", result.threshold);
    println!("  Metric: {}", result.metric);
    println!("  Columns: {}", result.columns.len());
    println!();
    println!("Results:");
    println!("  Table A: {} data rows, {}", result.table_a.rows.len(), format_summary_line(&result.summary.table_a));
    println!("  Table B: {} data rows, {}", result.table_b.rows.len(), format_summary_line(&result.summary.table_b));
    println!("  Differing positions: {}", result.summary.differing_positions);
}

/// Format a differing cell as a human-readable string.
pub fn format_record(record: &DiffRecord) -> String {
    format!(
        "Row {} [{}]: {:?} ↔ {:?}",
        record.row,
        record.column,
        truncate_text(&record.value_a, 60),
        truncate_text(&record.value_b, 60),
    )
}

/// Print differing cells in a human-readable format.
pub fn print_diffs(records: &[DiffRecord], limit: Option<usize>) {
    let to_print = match limit {
        Some(n) => &records[..n.min(records.len())],
        None => records,
    };

    for record in to_print {
        println!("{}", format_record(record));
    }

    if let Some(n) = limit {
        if records.len() > n {
            println!("... and {} more cells", records.len() - n);
        }
    }
}

/// Truncate text to a maximum length, adding ellipsis if needed.
fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
