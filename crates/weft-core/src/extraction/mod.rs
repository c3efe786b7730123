pub mod delimited;
pub mod xlsx;

use crate::error::WeftError;
use crate::model::{CellValue, RawRow};
use std::path::Path;

pub use delimited::DelimitedReader;
pub use xlsx::XlsxReader;

/// Trait for spreadsheet decoding backends.
///
/// Implementations treat the first row as the header row and return one
/// `RawRow` per data row, keyed by the header text exactly as written.
/// Interior blank rows are kept so row numbers line up with the sheet;
/// trailing blank rows are dropped.
pub trait RowReader: Send + Sync {
    fn read_rows(&self, bytes: &[u8]) -> Result<Vec<RawRow>, WeftError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Pick a reader from the file extension: `.xlsx`/`.xlsm` go through
/// calamine, `.tsv` is tab-delimited, anything else is read as CSV.
pub fn reader_for_path(path: &Path, sheet: Option<String>) -> Box<dyn RowReader> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" => Box::new(XlsxReader { sheet }),
        "tsv" => Box::new(DelimitedReader::new(b'\t')),
        _ => Box::new(DelimitedReader::default()),
    }
}

/// Read a spreadsheet file into raw rows.
pub fn read_rows_from_path(path: &Path, sheet: Option<String>) -> Result<Vec<RawRow>, WeftError> {
    let bytes = std::fs::read(path)?;
    reader_for_path(path, sheet).read_rows(&bytes)
}

/// Zip a header row with data rows. Cells under blank headers are skipped;
/// repeated headers keep the first column.
pub(crate) fn rows_from_grid<I>(headers: &[String], rows: I) -> Vec<RawRow>
where
    I: IntoIterator<Item = Vec<CellValue>>,
{
    let mut out: Vec<RawRow> = rows
        .into_iter()
        .map(|cells| {
            let mut row = RawRow::new();
            for (header, cell) in headers.iter().zip(cells) {
                if header.trim().is_empty() {
                    continue;
                }
                row.entry(header.clone()).or_insert(cell);
            }
            row
        })
        .collect();

    while out
        .last()
        .is_some_and(|row| row.values().all(CellValue::is_blank))
    {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_for_path() {
        assert_eq!(reader_for_path(Path::new("a.XLSX"), None).backend_name(), "calamine-xlsx");
        assert_eq!(reader_for_path(Path::new("a.csv"), None).backend_name(), "csv");
        assert_eq!(reader_for_path(Path::new("a.tsv"), None).backend_name(), "csv");
    }

    #[test]
    fn test_rows_from_grid_drops_trailing_blank_rows() {
        let headers = vec!["sku".to_string(), "".to_string(), "sku".to_string()];
        let rows = rows_from_grid(
            &headers,
            vec![
                vec![CellValue::from("A"), CellValue::from("x"), CellValue::from("B")],
                vec![CellValue::Blank, CellValue::Blank, CellValue::Blank],
                vec![CellValue::from("C")],
                vec![CellValue::from(" ")],
                vec![],
            ],
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["sku"], CellValue::from("A"));
        assert_eq!(rows[0].len(), 1);
        assert!(rows[1].values().all(CellValue::is_blank));
        assert_eq!(rows[2]["sku"], CellValue::from("C"));
    }
}
