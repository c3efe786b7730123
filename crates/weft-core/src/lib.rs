pub mod calc;
pub mod error;
pub mod extraction;
pub mod factors;
pub mod model;
pub mod parsing;
pub mod sku;
pub mod template;
pub mod validate;

use calc::outcome::{AggregateStats, CalculatedRow};
use factors::schema::FactorTable;
use model::RawRow;
use serde::Serialize;
use sku::{ExistingSkuCheck, SkuRegistry};
use tracing::info;
use validate::ValidationResult;

pub use calc::{
    assess, assess_with, calculate, calculate_bulk_carbon, calculate_with, get_aggregate_stats,
    validate_assessment,
};
pub use error::WeftError;
pub use validate::validate_rows;

/// Settings for `import_rows`.
#[derive(Clone, Copy)]
pub struct ImportOptions<'a> {
    pub factors: &'a FactorTable,
    /// Checked after validation when present; failures only cost the check.
    pub sku_registry: Option<&'a dyn SkuRegistry>,
}

impl Default for ImportOptions<'_> {
    fn default() -> Self {
        ImportOptions {
            factors: factors::default_table(),
            sku_registry: None,
        }
    }
}

/// Everything one import attempt produces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub validation: ValidationResult,
    /// Calculated valid rows, in source order.
    pub calculated: Vec<CalculatedRow>,
    pub stats: AggregateStats,
    /// `None` when no registry was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_skus: Option<ExistingSkuCheck>,
}

/// Main API entry point: map, validate, calculate and aggregate a batch.
///
/// Invalid rows never stop the batch; valid rows always reach the
/// calculation. Only the caller decides whether errors block the import.
pub fn import_rows(raw_rows: &[RawRow], options: &ImportOptions<'_>) -> ImportReport {
    let validation = validate_rows(raw_rows);
    let calculated = calc::calculate_bulk_carbon_with(&validation.valid_rows, options.factors);
    let stats = get_aggregate_stats(&calculated);

    let existing_skus = options
        .sku_registry
        .map(|registry| sku::check_existing_skus(&validation.valid_rows, registry));

    info!(
        total = validation.total_rows,
        valid = validation.valid_count,
        invalid = validation.error_count,
        warnings = validation.warning_count,
        total_co2 = %stats.total_co2,
        factors = %options.factors.name,
        "import processed"
    );

    ImportReport {
        validation,
        calculated,
        stats,
        existing_skus,
    }
}

impl ImportReport {
    /// Batch warnings plus any existing-SKU warnings, ordered by row.
    pub fn all_warnings(&self) -> Vec<&validate::ValidationError> {
        let mut warnings: Vec<_> = self.validation.warnings.iter().collect();
        if let Some(check) = &self.existing_skus {
            warnings.extend(check.warnings());
        }
        warnings.sort_by_key(|w| w.row);
        warnings
    }
}
