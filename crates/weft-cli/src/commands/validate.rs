use std::path::Path;
use weft_core::error::WeftError;

use crate::commands::load_rows;
use crate::output;

pub fn run(input_file: &Path, sheet: Option<String>, output_format: &str) -> Result<(), WeftError> {
    let rows = load_rows(input_file, sheet)?;
    let result = weft_core::validate_rows(&rows);

    match output_format {
        "json" => output::json::print(&result)?,
        _ => output::table::print_validation(&result),
    }

    Ok(())
}
