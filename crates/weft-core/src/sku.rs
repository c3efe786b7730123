//! Best-effort comparison of a batch against SKUs that already exist in a
//! backend. The registry is a collaborator; any failure is swallowed and
//! reported as `Unavailable` so it is never mistaken for "no duplicates".

use crate::error::WeftError;
use crate::model::{BulkProductRow, Field};
use crate::validate::engine::sku_key;
use crate::validate::outcome::ValidationError;
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

/// Source of SKUs that are already stored.
pub trait SkuRegistry: Send + Sync {
    fn existing_skus(&self) -> Result<Vec<String>, WeftError>;

    /// Name of this registry (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// A fixed SKU list, e.g. loaded from a file.
#[derive(Debug, Clone, Default)]
pub struct InMemorySkuRegistry {
    skus: Vec<String>,
}

impl InMemorySkuRegistry {
    pub fn new<I, S>(skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InMemorySkuRegistry {
            skus: skus.into_iter().map(Into::into).collect(),
        }
    }

    /// One SKU per line; blank lines and `#` comments are skipped.
    pub fn from_lines(text: &str) -> Self {
        InMemorySkuRegistry::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }
}

impl SkuRegistry for InMemorySkuRegistry {
    fn existing_skus(&self) -> Result<Vec<String>, WeftError> {
        Ok(self.skus.clone())
    }

    fn backend_name(&self) -> &str {
        "in-memory"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ExistingSkuCheck {
    /// The registry answered; one warning per row whose SKU already exists.
    Checked { warnings: Vec<ValidationError> },
    /// The registry could not be queried; nothing is known about duplicates.
    Unavailable { reason: String },
}

impl ExistingSkuCheck {
    pub fn warnings(&self) -> &[ValidationError] {
        match self {
            ExistingSkuCheck::Checked { warnings } => warnings,
            ExistingSkuCheck::Unavailable { .. } => &[],
        }
    }
}

/// Flag rows whose SKU (trimmed, case-insensitive) is already registered.
pub fn check_existing_skus(
    rows: &[BulkProductRow],
    registry: &dyn SkuRegistry,
) -> ExistingSkuCheck {
    let existing: HashSet<String> = match registry.existing_skus() {
        Ok(skus) => skus.iter().map(|s| sku_key(s)).collect(),
        Err(e) => {
            warn!(
                backend = registry.backend_name(),
                error = %e,
                "existing SKU check skipped"
            );
            return ExistingSkuCheck::Unavailable {
                reason: e.to_string(),
            };
        }
    };

    let warnings = rows
        .iter()
        .filter(|row| existing.contains(&sku_key(&row.sku)))
        .map(|row| {
            ValidationError::warning(
                row.source_row,
                Field::Sku.code(),
                format!("SKU '{}' already exists", row.sku.trim()),
            )
        })
        .collect();

    ExistingSkuCheck::Checked { warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        EnergySource, MarketType, Material, MaterialSource, ProductType, TransportMode,
    };
    use rust_decimal_macros::dec;

    struct BrokenRegistry;

    impl SkuRegistry for BrokenRegistry {
        fn existing_skus(&self) -> Result<Vec<String>, WeftError> {
            Err(WeftError::SkuRegistry("connection refused".into()))
        }

        fn backend_name(&self) -> &str {
            "broken"
        }
    }

    fn row(sku: &str, source_row: usize) -> BulkProductRow {
        BulkProductRow {
            source_row,
            sku: sku.into(),
            product_name: "Tee".into(),
            product_type: ProductType::Tshirt,
            quantity: 1,
            weight_per_unit: dec!(200),
            primary_material: Material::Cotton,
            primary_material_percentage: dec!(100),
            secondary_material: None,
            secondary_material_percentage: None,
            accessories: vec![],
            material_source: MaterialSource::Domestic,
            processes: vec![],
            energy_source: Some(EnergySource::Grid),
            market_type: MarketType::Domestic,
            export_country: None,
            transport_mode: Some(TransportMode::Road),
        }
    }

    #[test]
    fn test_existing_skus_flagged() {
        let registry = InMemorySkuRegistry::from_lines("# stored\nts-001\n\nPT-9\n");
        let check = check_existing_skus(&[row("TS-001 ", 2), row("NEW", 3)], &registry);
        let warnings = check.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].row, 2);
        assert_eq!(warnings[0].field, "sku");
    }

    #[test]
    fn test_registry_failure_is_unavailable_not_clean() {
        let check = check_existing_skus(&[row("A", 2)], &BrokenRegistry);
        assert!(matches!(check, ExistingSkuCheck::Unavailable { .. }));
        assert!(check.warnings().is_empty());
    }

    #[test]
    fn test_check_serializes_with_status() {
        let check = ExistingSkuCheck::Unavailable {
            reason: "down".into(),
        };
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["status"], "unavailable");
    }
}
