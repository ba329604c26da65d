//! Positional table alignment and diff marking.
//!
//! Tables are paired by identical row number and column key; nothing is
//! reordered or matched fuzzily. Every aligned cell pair is scored with the
//! chosen metric and tagged Different on each side that actually holds a
//! value when the score falls strictly below the threshold.

use crate::models::{AnnotatedCell, AnnotatedTable, ColumnKey, DiffSummary, Metric, Table, MAX_THRESHOLD};
use crate::similarity::similarity;

/// Column keys under comparison: A's header positions, or B's when A has none.
pub fn column_keys(table_a: &Table, table_b: &Table) -> Vec<ColumnKey> {
    let header = table_a.header().or_else(|| table_b.header()).unwrap_or(&[]);
    (0..header.len()).collect()
}

/// Mark low-similarity cells in both tables.
///
/// Never fails: missing rows and cells compare as empty strings. Header
/// equality is not checked here; see [`crate::compare::compare_tables`].
pub fn mark(
    table_a: &Table,
    table_b: &Table,
    threshold: u8,
    metric: Metric,
) -> (AnnotatedTable, AnnotatedTable) {
    let threshold = f64::from(threshold.min(MAX_THRESHOLD));
    let columns = column_keys(table_a, table_b);
    let last_row = table_a.row_count().max(table_b.row_count());

    let mut annotated_a = AnnotatedTable::plain(table_a);
    let mut annotated_b = AnnotatedTable::plain(table_b);

    for row in 2..=last_row {
        for &col in &columns {
            let value_a = table_a.cell(row, col);
            let value_b = table_b.cell(row, col);

            let sim = similarity(value_a.unwrap_or(""), value_b.unwrap_or(""), metric);
            if sim >= threshold {
                continue;
            }

            // Only tag positions the source table actually fills
            if has_value(value_a) {
                tag_different(&mut annotated_a, row, col);
            }
            if has_value(value_b) {
                tag_different(&mut annotated_b, row, col);
            }
        }
    }

    (annotated_a, annotated_b)
}

/// Blank cells count as absent, the same as cells past the end of a row.
#[inline]
fn has_value(cell: Option<&str>) -> bool {
    cell.is_some_and(|value| !value.is_empty())
}

#[inline]
fn tag_different(table: &mut AnnotatedTable, row: usize, col: ColumnKey) {
    if let Some(cell) = table.cell_mut(row, col) {
        if let AnnotatedCell::Plain(value) = cell {
            *cell = AnnotatedCell::Different(std::mem::take(value));
        }
    }
}

/// Rows containing at least one Different cell, and the total of such cells.
pub fn summarize(table: &AnnotatedTable) -> DiffSummary {
    table
        .rows
        .iter()
        .map(|row| row.iter().filter(|cell| cell.is_different()).count())
        .filter(|&count| count > 0)
        .fold(DiffSummary::default(), |mut acc, count| {
            acc.rows_with_diff += 1;
            acc.cells_different += count;
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        rows.iter().map(|row| row.to_vec()).collect()
    }

    #[test]
    fn test_identical_tables_unmarked() {
        let a = table(&[&["Nome", "Valor"], &["Ana", "100"], &["Bia", "200"]]);
        let (ma, mb) = mark(&a, &a, 100, Metric::EditDistance);

        assert_eq!(summarize(&ma), DiffSummary::default());
        assert_eq!(summarize(&mb), DiffSummary::default());
        assert_eq!(ma, AnnotatedTable::plain(&a));
    }

    #[test]
    fn test_header_never_annotated() {
        let a = table(&[&["Nome"], &["x"]]);
        let b = table(&[&["Outro"], &["y"]]);
        let (ma, mb) = mark(&a, &b, 100, Metric::CharacterOverlap);

        assert_eq!(ma.header, vec!["Nome"]);
        assert_eq!(mb.header, vec!["Outro"]);
        assert!(ma.rows[0][0].is_different());
        assert!(mb.rows[0][0].is_different());
    }

    #[test]
    fn test_threshold_boundary() {
        // One edit out of four characters: similarity is exactly 75
        let a = table(&[&["V"], &["abcd"]]);
        let b = table(&[&["V"], &["abcx"]]);
        let (ma, _) = mark(&a, &b, 75, Metric::EditDistance);
        assert!(!ma.rows[0][0].is_different());

        let (ma, mb) = mark(&a, &b, 76, Metric::EditDistance);
        assert!(ma.rows[0][0].is_different());
        assert!(mb.rows[0][0].is_different());
    }

    #[test]
    fn test_zero_threshold_marks_nothing() {
        let a = table(&[&["V"], &["abc"]]);
        let b = table(&[&["V"], &["xyz"]]);
        let (ma, mb) = mark(&a, &b, 0, Metric::CharacterOverlap);
        assert_eq!(summarize(&ma).cells_different, 0);
        assert_eq!(summarize(&mb).cells_different, 0);
    }

    #[test]
    fn test_ragged_rows_only_tag_present_side() {
        let a = table(&[
            &["K", "V"],
            &["1", "a"],
            &["2", "b"],
            &["3", "c"],
            &["4", "d"],
            &["5", "e"],
        ]);
        let b = table(&[&["K", "V"], &["1", "a"], &["2", "b"], &["3", "c"]]);

        let (ma, mb) = mark(&a, &b, 80, Metric::EditDistance);

        assert_eq!(mb.rows.len(), 3);
        assert_eq!(summarize(&mb), DiffSummary::default());
        assert_eq!(
            summarize(&ma),
            DiffSummary {
                rows_with_diff: 2,
                cells_different: 4
            }
        );
        assert!(ma.cell(5, 0).unwrap().is_different());
        assert!(ma.cell(6, 1).unwrap().is_different());
        assert!(!ma.cell(4, 1).unwrap().is_different());
    }

    #[test]
    fn test_ragged_columns() {
        // B's second row lacks the "V" cell entirely
        let a = table(&[&["K", "V"], &["1", "a"]]);
        let b = table(&[&["K", "V"], &["1"]]);

        let (ma, mb) = mark(&a, &b, 50, Metric::CharacterOverlap);
        assert!(ma.cell(2, 1).unwrap().is_different());
        assert!(!ma.cell(2, 0).unwrap().is_different());
        assert_eq!(mb.rows[0].len(), 1);
        assert_eq!(summarize(&mb).cells_different, 0);
    }

    #[test]
    fn test_missing_cells_on_both_sides_compare_equal() {
        // Both sides empty at a position -> similarity 100, never marked
        let a = table(&[&["K", "V"], &["1", ""]]);
        let b = table(&[&["K", "V"], &["1"]]);
        let (ma, _) = mark(&a, &b, 100, Metric::EditDistance);
        assert!(!ma.cell(2, 1).unwrap().is_different());
    }

    #[test]
    fn test_blank_cell_never_tagged() {
        let a = table(&[&["Nome", "Obs"], &["Ana", "pago"]]);
        let b = table(&[&["Nome", "Obs"], &["Ana", ""]]);

        let (ma, mb) = mark(&a, &b, 80, Metric::EditDistance);
        assert_eq!(ma.cell(2, 1), Some(&AnnotatedCell::Different("pago".into())));
        assert_eq!(mb.cell(2, 1), Some(&AnnotatedCell::Plain(String::new())));
        assert_eq!(summarize(&mb), DiffSummary::default());
        assert_eq!(
            summarize(&ma),
            DiffSummary {
                rows_with_diff: 1,
                cells_different: 1
            }
        );
    }

    #[test]
    fn test_columns_beyond_header_not_compared() {
        let a = table(&[&["K"], &["1", "extra"]]);
        let b = table(&[&["K"], &["1", "other"]]);
        let (ma, mb) = mark(&a, &b, 100, Metric::EditDistance);
        assert_eq!(ma.rows[0][1], AnnotatedCell::Plain("extra".into()));
        assert_eq!(mb.rows[0][1], AnnotatedCell::Plain("other".into()));
    }

    #[test]
    fn test_column_keys_fallback_to_b_header() {
        let a = Table::default();
        let b = table(&[&["X", "Y", "Z"], &["1", "2", "3"]]);
        assert_eq!(column_keys(&a, &b), vec![0, 1, 2]);

        let (ma, mb) = mark(&a, &b, 80, Metric::CharacterOverlap);
        assert!(ma.rows.is_empty());
        assert_eq!(summarize(&mb).cells_different, 3);
    }

    #[test]
    fn test_no_header_anywhere_is_empty() {
        let (ma, mb) = mark(&Table::default(), &Table::default(), 80, Metric::EditDistance);
        assert!(ma.rows.is_empty());
        assert!(mb.rows.is_empty());
        assert_eq!(column_keys(&Table::default(), &Table::default()), Vec::<usize>::new());
    }

    #[test]
    fn test_threshold_above_range_is_clamped() {
        let a = table(&[&["V"], &["same"]]);
        let (ma, _) = mark(&a, &a, 255, Metric::CharacterOverlap);
        assert_eq!(summarize(&ma).cells_different, 0);
    }

    #[test]
    fn test_different_keeps_raw_value() {
        let a = table(&[&["V"], &["  Ana  "]]);
        let b = table(&[&["V"], &["Zeca"]]);
        let (ma, _) = mark(&a, &b, 80, Metric::EditDistance);
        assert_eq!(ma.rows[0][0], AnnotatedCell::Different("  Ana  ".into()));
    }
}
