use crate::error::WeftError;
use crate::extraction::{rows_from_grid, RowReader};
use crate::model::{CellValue, RawRow};

const UTF8_BOM: char = '\u{feff}';

/// Reads delimited text (CSV, TSV) with the csv crate. Every cell comes back
/// as text; numbers are parsed later by the row mapper.
#[derive(Debug, Clone)]
pub struct DelimitedReader {
    pub delimiter: u8,
}

impl DelimitedReader {
    pub fn new(delimiter: u8) -> Self {
        DelimitedReader { delimiter }
    }
}

impl Default for DelimitedReader {
    fn default() -> Self {
        DelimitedReader::new(b',')
    }
}

impl RowReader for DelimitedReader {
    fn read_rows(&self, bytes: &[u8]) -> Result<Vec<RawRow>, WeftError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .has_headers(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                if idx == 0 {
                    h.trim_start_matches(UTF8_BOM).to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(
                record
                    .iter()
                    .map(|field| {
                        if field.trim().is_empty() {
                            CellValue::Blank
                        } else {
                            CellValue::Text(field.to_string())
                        }
                    })
                    .collect::<Vec<_>>(),
            );
        }

        Ok(rows_from_grid(&headers, records))
    }

    fn backend_name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_rows_keyed_by_header() {
        let csv = "\u{feff}Mã SKU,Số lượng,Ghi chú\nAT-01,100,\nAT-02,\"1,5\",rush\n,,\n";
        let rows = DelimitedReader::default().read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Mã SKU"], CellValue::from("AT-01"));
        assert_eq!(rows[0]["Ghi chú"], CellValue::Blank);
        assert_eq!(rows[1]["Số lượng"], CellValue::from("1,5"));
    }

    #[test]
    fn test_short_records_are_tolerated() {
        let tsv = "sku\tquantity\nA\n";
        let rows = DelimitedReader::new(b'\t').read_rows(tsv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].contains_key("quantity"));
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let bytes = b"sku\n\xff\xfe\n";
        assert!(DelimitedReader::default().read_rows(bytes).is_err());
    }
}
