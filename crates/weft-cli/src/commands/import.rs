use std::path::Path;
use weft_core::error::WeftError;
use weft_core::sku::{InMemorySkuRegistry, SkuRegistry};
use weft_core::{import_rows, ImportOptions};

use crate::commands::{load_factors, load_rows};
use crate::output;

pub fn run(
    input_file: &Path,
    sheet: Option<String>,
    factors_file: Option<&Path>,
    existing_skus_file: Option<&Path>,
    output_format: &str,
    strict: bool,
) -> Result<(), WeftError> {
    let rows = load_rows(input_file, sheet)?;
    let factors = load_factors(factors_file)?;

    let registry = match existing_skus_file {
        Some(path) => Some(InMemorySkuRegistry::from_lines(&std::fs::read_to_string(
            path,
        )?)),
        None => None,
    };

    let options = ImportOptions {
        factors: &factors,
        sku_registry: registry.as_ref().map(|r| r as &dyn SkuRegistry),
    };
    let report = import_rows(&rows, &options);

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_import(&report),
    }

    if strict && !report.validation.is_valid {
        return Err(WeftError::RowsRejected {
            invalid: report.validation.error_count,
            total: report.validation.total_rows,
        });
    }

    Ok(())
}
