use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::error::WeftError;
use crate::extraction::{rows_from_grid, RowReader};
use crate::model::{CellValue, RawRow};

/// Reads `.xlsx` workbooks with calamine.
#[derive(Debug, Clone, Default)]
pub struct XlsxReader {
    /// Sheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
}

impl RowReader for XlsxReader {
    fn read_rows(&self, bytes: &[u8]) -> Result<Vec<RawRow>, WeftError> {
        let cursor = Cursor::new(bytes);
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
            .map_err(|e| WeftError::Read(format!("failed to open xlsx: {e}")))?;

        let range = match &self.sheet {
            Some(name) => workbook
                .worksheet_range(name)
                .map_err(|e| WeftError::Read(format!("sheet '{name}' not found: {e}")))?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| WeftError::Read("workbook has no sheets".into()))?
                .map_err(|e| WeftError::Read(format!("failed to read first sheet: {e}")))?,
        };

        let mut grid = range.rows();
        let Some(header_cells) = grid.next() else {
            return Ok(Vec::new());
        };
        let headers: Vec<String> = header_cells
            .iter()
            .map(|c| match to_cell_value(c) {
                CellValue::Blank => String::new(),
                other => other.as_text().unwrap_or_default(),
            })
            .collect();

        Ok(rows_from_grid(
            &headers,
            grid.map(|cells| cells.iter().map(to_cell_value).collect()),
        ))
    }

    fn backend_name(&self) -> &str {
        "calamine-xlsx"
    }
}

fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Blank,
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        _ => CellValue::Text(format!("{cell}")),
    }
}
