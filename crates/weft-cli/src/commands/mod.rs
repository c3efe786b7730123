pub mod assess;
pub mod factors;
pub mod import;
pub mod template;
pub mod validate;

use std::path::Path;
use tracing::debug;
use weft_core::error::WeftError;
use weft_core::extraction::reader_for_path;
use weft_core::factors::schema::FactorTable;
use weft_core::model::RawRow;

/// Read import rows from a spreadsheet, delimited text, or a JSON array.
pub fn load_rows(path: &Path, sheet: Option<String>) -> Result<Vec<RawRow>, WeftError> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let rows = if is_json {
        let json = std::fs::read_to_string(path)?;
        weft_core::parsing::parse_raw_rows_json(&json)?
    } else {
        let bytes = std::fs::read(path)?;
        let reader = reader_for_path(path, sheet);
        debug!(backend = reader.backend_name(), path = %path.display(), "reading rows");
        reader.read_rows(&bytes)?
    };
    Ok(rows)
}

/// The custom table at `path`, or the shipped one.
pub fn load_factors(path: Option<&Path>) -> Result<FactorTable, WeftError> {
    match path {
        Some(path) => weft_core::factors::load_factor_table(path),
        None => Ok(weft_core::factors::default_table().clone()),
    }
}
