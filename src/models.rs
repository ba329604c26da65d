//! Data structures for the spreadsheet comparison pipeline.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Similarity metric used to score an aligned cell pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    /// Recursive longest-common-substring overlap ratio (default)
    #[default]
    CharacterOverlap,
    /// Normalized Levenshtein ratio
    EditDistance,
}

impl Metric {
    /// Resolve a metric selector as typed by a user or stored in config.
    ///
    /// Unrecognized selectors fall back to character overlap.
    pub fn from_selector(selector: &str) -> Self {
        Self::parse_selector(selector).unwrap_or_default()
    }

    /// Strict variant of [`Metric::from_selector`]; `None` for unknown selectors.
    pub fn parse_selector(selector: &str) -> Option<Self> {
        match selector.trim().to_lowercase().as_str() {
            "levenshtein" | "edit-distance" | "edit_distance" | "editdistance" => {
                Some(Metric::EditDistance)
            }
            "characters" | "caracteres" | "character-overlap" | "character_overlap"
            | "similar-text" | "similar_text" => Some(Metric::CharacterOverlap),
            _ => None,
        }
    }

    /// Canonical selector name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::CharacterOverlap => "characters",
            Metric::EditDistance => "levenshtein",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let selector = String::deserialize(deserializer)?;
        Ok(Metric::from_selector(&selector))
    }
}

/// Highest accepted threshold (percent)
pub const MAX_THRESHOLD: u8 = 100;

/// Comparison parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonParams {
    /// Minimum similarity (percent) for a cell pair to count as equal
    pub threshold: u8,
    pub metric: Metric,
}

impl Default for ComparisonParams {
    fn default() -> Self {
        Self {
            threshold: 80,
            metric: Metric::CharacterOverlap,
        }
    }
}

impl ComparisonParams {
    /// Set the threshold from unchecked user input, clamped to `[0, 100]`.
    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold.clamp(0, MAX_THRESHOLD as i64) as u8;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Threshold clamped into the valid range.
    pub fn effective_threshold(&self) -> u8 {
        self.threshold.min(MAX_THRESHOLD)
    }
}

/// Ordinal column position, stable across both tables of a comparison
pub type ColumnKey = usize;

/// A table of text cells; row 1 is the header, rows 2.. are data.
///
/// Rows may be ragged: a row shorter than the header simply has no value at
/// the missing column keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Number of rows including the header.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header labels, `None` for a table without any row.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Row by 1-based spreadsheet number.
    pub fn row(&self, number: usize) -> Option<&[String]> {
        number
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
            .map(Vec::as_slice)
    }

    /// Cell at a 1-based row number and column key, `None` when absent.
    pub fn cell(&self, number: usize, column: ColumnKey) -> Option<&str> {
        self.row(number)
            .and_then(|row| row.get(column))
            .map(String::as_str)
    }

    /// Data rows (everything after the header).
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<S: Into<String>> FromIterator<Vec<S>> for Table {
    fn from_iter<I: IntoIterator<Item = Vec<S>>>(iter: I) -> Self {
        Self::from_rows(
            iter.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

/// A data cell tagged by the diff marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum AnnotatedCell {
    Plain(String),
    Different(String),
}

impl AnnotatedCell {
    pub fn value(&self) -> &str {
        match self {
            AnnotatedCell::Plain(v) | AnnotatedCell::Different(v) => v,
        }
    }

    pub fn is_different(&self) -> bool {
        matches!(self, AnnotatedCell::Different(_))
    }
}

/// Parallel structure to a [`Table`] with every data cell tagged.
///
/// `rows[0]` is spreadsheet row 2. Shape mirrors the source table exactly;
/// rows or cells absent in the source stay absent here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<AnnotatedCell>>,
}

impl AnnotatedTable {
    /// Untagged copy of a source table.
    pub fn plain(table: &Table) -> Self {
        Self {
            header: table.header().map(<[String]>::to_vec).unwrap_or_default(),
            rows: table
                .data_rows()
                .iter()
                .map(|row| row.iter().cloned().map(AnnotatedCell::Plain).collect())
                .collect(),
        }
    }

    /// Cell at a 1-based spreadsheet row number (2 = first data row).
    pub fn cell(&self, number: usize, column: ColumnKey) -> Option<&AnnotatedCell> {
        number
            .checked_sub(2)
            .and_then(|idx| self.rows.get(idx))
            .and_then(|row| row.get(column))
    }

    pub(crate) fn cell_mut(&mut self, number: usize, column: ColumnKey) -> Option<&mut AnnotatedCell> {
        number
            .checked_sub(2)
            .and_then(|idx| self.rows.get_mut(idx))
            .and_then(|row| row.get_mut(column))
    }

    /// Iterate `(row_number, row)` with spreadsheet numbering.
    pub fn numbered_rows(&self) -> impl Iterator<Item = (usize, &[AnnotatedCell])> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (idx + 2, row.as_slice()))
    }
}

/// Difference counts for one annotated table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub rows_with_diff: usize,
    pub cells_different: usize,
}

/// Counts for both sides of a comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub table_a: DiffSummary,
    pub table_b: DiffSummary,
    /// Positions where at least one side is Different
    pub differing_positions: usize,
}

/// One exported differing position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub column: String,
    pub value_a: String,
    pub value_b: String,
    /// 1-based spreadsheet row (header = 1)
    pub row: usize,
}

/// Full comparison result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub version: String,
    pub threshold: u8,
    pub metric: Metric,
    pub columns: Vec<String>,
    pub table_a: AnnotatedTable,
    pub table_b: AnnotatedTable,
    pub summary: ComparisonSummary,
}

impl ComparisonResult {
    /// Parameters that produced this result.
    pub fn params(&self) -> ComparisonParams {
        ComparisonParams {
            threshold: self.threshold,
            metric: self.metric,
        }
    }

    /// Last spreadsheet row number present on either side.
    pub fn last_row(&self) -> usize {
        self.table_a.rows.len().max(self.table_b.rows.len()) + 1
    }
}

/// One pair of workbooks in a batch manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPair {
    #[serde(default)]
    pub name: Option<String>,
    pub file_a: PathBuf,
    pub file_b: PathBuf,
    #[serde(default)]
    pub sheet_a: Option<String>,
    #[serde(default)]
    pub sheet_b: Option<String>,
}

impl BatchPair {
    /// Explicit name, or "<stem A>_vs_<stem B>".
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let stem = |path: &Path| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        format!("{}_vs_{}", stem(&self.file_a), stem(&self.file_b))
    }
}
