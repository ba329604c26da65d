//! Spreadsheet loading: turns a workbook sheet into a [`Table`] of text cells.

use crate::models::Table;
use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Sheet '{sheet}' not found in {}", .path.display())]
    SheetNotFound { path: PathBuf, sheet: String },
    #[error("Workbook has no sheets: {}", .0.display())]
    EmptyWorkbook(PathBuf),
}

/// Load one sheet of a workbook (xlsx, xlsm, xls, ods) as a text table.
///
/// Uses `sheet` when given, otherwise the first sheet.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    if !path.is_file() {
        return Err(LoadError::MissingFile(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: name.to_string(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::EmptyWorkbook(path.to_path_buf()))?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let table = range_to_table(&range);

    debug!(
        path = %path.display(),
        sheet = %sheet_name,
        rows = table.row_count(),
        "loaded sheet"
    );

    Ok(table)
}

/// Flatten a calamine range into text rows anchored at A1.
///
/// calamine starts a range at the first used cell; leading empty rows and
/// columns are padded back so column keys match the sheet's own positions.
pub fn range_to_table(range: &Range<Data>) -> Table {
    let (start_row, start_col) = match range.start() {
        Some((row, col)) => (row as usize, col as usize),
        None => return Table::default(),
    };

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(start_row + range.height());
    let width = start_col + range.width();

    for _ in 0..start_row {
        rows.push(vec![String::new(); width]);
    }

    for row in range.rows() {
        let mut cells = Vec::with_capacity(width);
        cells.resize(start_col, String::new());
        cells.extend(row.iter().map(cell_to_string));
        rows.push(cells);
    }

    Table::from_rows(rows)
}

/// Text form of a single cell, as a spreadsheet would display it.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => format_excel_datetime(dt),
        other => other.to_string(),
    }
}

/// Serial dates print as ISO text: a date alone when there is no time part,
/// a time alone for serials within the first day.
fn format_excel_datetime(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return match dt.as_duration() {
            Some(duration) => format_duration(duration),
            None => format_float(dt.as_f64()),
        };
    }

    let Some(datetime) = dt.as_datetime() else {
        return format_float(dt.as_f64());
    };
    let serial = dt.as_f64();
    if serial < 1.0 {
        datetime.time().to_string()
    } else if serial.fract() == 0.0 {
        datetime.date().to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn format_duration(duration: chrono::Duration) -> String {
    let seconds = duration.num_seconds();
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Integral floats print without a fractional part ("100", not "100.0").
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::ExcelDateTimeType;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("Ana".into())), "Ana");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Float(100.0)), "100");
        assert_eq!(cell_to_string(&Data::Float(-3.0)), "-3");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_to_string(&Data::Bool(false)), "FALSE");
        assert_eq!(
            cell_to_string(&Data::DateTimeIso("2024-01-31".into())),
            "2024-01-31"
        );
    }

    #[test]
    fn test_cell_to_string_serial_dates() {
        let date = |serial: f64| {
            Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false))
        };
        assert_eq!(cell_to_string(&date(45322.0)), "2024-01-31");
        assert_eq!(cell_to_string(&date(45322.5)), "2024-01-31 12:00:00");
        assert_eq!(cell_to_string(&date(0.75)), "18:00:00");

        let duration = Data::DateTime(ExcelDateTime::new(
            1.5,
            ExcelDateTimeType::TimeDelta,
            false,
        ));
        assert_eq!(cell_to_string(&duration), "36:00:00");
    }

    #[test]
    fn test_range_to_table_from_a1() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("Nome".into()));
        range.set_value((0, 1), Data::String("Valor".into()));
        range.set_value((1, 0), Data::String("Ana".into()));
        range.set_value((1, 1), Data::Float(100.0));

        let table = range_to_table(&range);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.header().unwrap(), ["Nome", "Valor"]);
        assert_eq!(table.cell(2, 1), Some("100"));
    }

    #[test]
    fn test_range_to_table_pads_offset_range() {
        // Used range starts at B2
        let mut range = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("K".into()));
        range.set_value((1, 2), Data::String("V".into()));
        range.set_value((2, 1), Data::Int(1));

        let table = range_to_table(&range);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.header().unwrap(), ["", "", ""]);
        assert_eq!(table.cell(2, 0), Some(""));
        assert_eq!(table.cell(2, 1), Some("K"));
        assert_eq!(table.cell(3, 1), Some("1"));
        assert_eq!(table.cell(3, 2), Some(""));
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(range_to_table(&range).is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = load_table(Path::new("/nonexistent/planilha.xlsx"), None).unwrap_err();
        assert!(matches!(err, LoadError::MissingFile(_)));
        assert!(err.to_string().contains("planilha.xlsx"));
    }

    #[test]
    fn test_corrupt_workbook_is_spreadsheet_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planilha.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let err = load_table(&path, None).unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet(_)));
    }
}
