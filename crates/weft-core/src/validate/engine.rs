use crate::model::{BulkProductRow, Field, MarketType, RawRow};
use crate::parsing::{map_row, DraftRow, NumericCell, FIRST_DATA_ROW};
use crate::template::required_fields;
use crate::validate::outcome::{InvalidRow, ValidationError, ValidationResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

/// Tolerance for the material percentage sum check.
pub const PERCENTAGE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Upper bound for any single material or energy share.
pub const MAX_PERCENTAGE: Decimal = Decimal::ONE_HUNDRED;

/// Heaviest accepted unit, in grams.
pub const MAX_WEIGHT_PER_UNIT_GRAMS: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Field key used for the primary + secondary percentage sum warning.
pub const MATERIAL_PERCENTAGE_FIELD: &str = "materialPercentage";

/// Field key for findings that belong to no single column.
pub const GENERAL_FIELD: &str = "general";

/// Map and validate a batch of raw rows.
///
/// Rows are processed in source order. Rows with only warnings are accepted;
/// a row with any error is rejected together with its partial data. Duplicate
/// SKUs among accepted rows are flagged on every row of the group once the
/// whole batch has been seen.
pub fn validate_rows(raw_rows: &[RawRow]) -> ValidationResult {
    let mut valid_rows = Vec::new();
    let mut invalid_rows = Vec::new();
    let mut warnings = Vec::new();
    let mut sku_rows: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for (idx, raw) in raw_rows.iter().enumerate() {
        let row_number = idx + FIRST_DATA_ROW;
        let draft = map_row(raw, row_number);
        let (accepted, findings) = validate_draft(draft);

        let (errors, row_warnings): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(ValidationError::is_error);
        warnings.extend(row_warnings);

        match accepted {
            Ok(row) => {
                sku_rows
                    .entry(sku_key(&row.sku))
                    .or_default()
                    .push(row_number);
                valid_rows.push(row);
            }
            Err(draft) => {
                debug!(row = row_number, errors = errors.len(), "row rejected");
                invalid_rows.push(InvalidRow {
                    row: row_number,
                    data: *draft,
                    errors,
                });
            }
        }
    }

    warnings.extend(duplicate_sku_warnings(&valid_rows, &sku_rows));
    warnings.sort_by_key(|w| w.row);

    let valid_count = valid_rows.len();
    let error_count = invalid_rows.len();
    ValidationResult {
        is_valid: error_count == 0,
        valid_rows,
        invalid_rows,
        warning_count: warnings.len(),
        warnings,
        total_rows: raw_rows.len(),
        valid_count,
        error_count,
    }
}

/// Validate one mapped row.
///
/// Returns the canonical row when no rule raised an error, otherwise the
/// draft back for reporting. Warnings are returned either way.
pub fn validate_draft(
    draft: DraftRow,
) -> (Result<BulkProductRow, Box<DraftRow>>, Vec<ValidationError>) {
    let row = draft.source_row;
    let mut findings = Vec::new();

    for field in required_fields() {
        if is_missing(&draft, field) {
            findings.push(ValidationError::error(
                row,
                field.code(),
                format!("Missing required field '{}'", field.code()),
            ));
        }
    }

    let quantity = check_quantity(&draft, &mut findings);
    check_weight(&draft, &mut findings);
    check_percentages(&draft, &mut findings);
    check_export(&draft, &mut findings);
    fallback_warnings(&draft, &mut findings);
    ambiguous_number_warnings(&draft, &mut findings);

    if findings.iter().any(ValidationError::is_error) {
        return (Err(Box::new(draft)), findings);
    }

    match quantity.and_then(|q| build_row(&draft, q)) {
        Some(product) => (Ok(product), findings),
        None => {
            findings.push(ValidationError::error(
                row,
                GENERAL_FIELD,
                "Row could not be converted to a product",
            ));
            (Err(Box::new(draft)), findings)
        }
    }
}

fn is_missing(draft: &DraftRow, field: Field) -> bool {
    match field {
        Field::Sku => draft.sku.is_none(),
        Field::ProductName => draft.product_name.is_none(),
        Field::ProductType => draft.product_type.is_none(),
        Field::Quantity => draft.quantity.is_none(),
        Field::WeightPerUnit => draft.weight_per_unit.is_none(),
        Field::PrimaryMaterial => draft.primary_material.is_none(),
        Field::PrimaryMaterialPercentage => draft.primary_material_percentage.is_none(),
        Field::SecondaryMaterial => draft.secondary_material.is_none(),
        Field::SecondaryMaterialPercentage => draft.secondary_material_percentage.is_none(),
        Field::Accessories => draft.accessories.is_empty(),
        Field::MaterialSource => draft.material_source.is_none(),
        Field::Processes => draft.processes.is_empty(),
        Field::EnergySource => draft.energy_source.is_none(),
        Field::MarketType => draft.market_type.is_none(),
        Field::ExportCountry => draft.export_country.is_none(),
        Field::TransportMode => draft.transport_mode.is_none(),
    }
}

/// Quantity must be a positive whole number that fits a `u32`.
fn check_quantity(draft: &DraftRow, findings: &mut Vec<ValidationError>) -> Option<u32> {
    let cell = draft.quantity.as_ref()?;
    let quantity = cell
        .value()
        .filter(|q| q.is_sign_positive() && !q.is_zero() && q.fract().is_zero())
        .and_then(|q| q.to_u32());
    if quantity.is_none() {
        findings.push(ValidationError::error(
            draft.source_row,
            Field::Quantity.code(),
            format!(
                "Quantity must be a positive whole number, got '{}'",
                display_cell(cell)
            ),
        ));
    }
    quantity
}

fn check_weight(draft: &DraftRow, findings: &mut Vec<ValidationError>) {
    let Some(cell) = draft.weight_per_unit.as_ref() else {
        return;
    };
    let message = match cell.value() {
        Some(w) if w.is_sign_positive() && !w.is_zero() && w <= MAX_WEIGHT_PER_UNIT_GRAMS => {
            return;
        }
        Some(w) if w > MAX_WEIGHT_PER_UNIT_GRAMS => format!(
            "Weight per unit must be at most {MAX_WEIGHT_PER_UNIT_GRAMS} g, got '{}'",
            w.normalize()
        ),
        _ => format!(
            "Weight per unit must be a positive number of grams, got '{}'",
            display_cell(cell)
        ),
    };
    findings.push(ValidationError::error(
        draft.source_row,
        Field::WeightPerUnit.code(),
        message,
    ));
}

fn check_percentages(draft: &DraftRow, findings: &mut Vec<ValidationError>) {
    let row = draft.source_row;
    let primary = percentage(
        row,
        Field::PrimaryMaterialPercentage,
        draft.primary_material_percentage.as_ref(),
        findings,
    );
    let secondary = percentage(
        row,
        Field::SecondaryMaterialPercentage,
        draft.secondary_material_percentage.as_ref(),
        findings,
    );

    if draft.secondary_material.is_none() && secondary.is_some_and(|s| !s.is_zero()) {
        findings.push(ValidationError::warning(
            row,
            Field::SecondaryMaterial.code(),
            "Secondary material percentage given without a secondary material",
        ));
    }

    if let Some(primary) = primary {
        let sum = primary.saturating_add(secondary.unwrap_or(Decimal::ZERO));
        if sum.saturating_sub(Decimal::ONE_HUNDRED).abs() > PERCENTAGE_TOLERANCE {
            findings.push(ValidationError::warning(
                row,
                MATERIAL_PERCENTAGE_FIELD,
                format!("Material percentages add up to {}%, expected 100%", sum.normalize()),
            ));
        }
    }
}

/// Parse a percentage cell. Non-numeric text and values outside 0-100 are
/// errors.
fn percentage(
    row: usize,
    field: Field,
    cell: Option<&NumericCell>,
    findings: &mut Vec<ValidationError>,
) -> Option<Decimal> {
    match cell? {
        NumericCell::Parsed(value) => {
            if value.is_sign_negative() || *value > MAX_PERCENTAGE {
                findings.push(ValidationError::error(
                    row,
                    field.code(),
                    format!("Percentage must be between 0 and 100, got {}", value.normalize()),
                ));
                return None;
            }
            Some(*value)
        }
        NumericCell::Invalid(raw) => {
            findings.push(ValidationError::error(
                row,
                field.code(),
                format!("Percentage must be a number, got '{raw}'"),
            ));
            None
        }
    }
}

fn check_export(draft: &DraftRow, findings: &mut Vec<ValidationError>) {
    if draft.market_type != Some(MarketType::Export) || draft.export_country.is_some() {
        return;
    }
    let unresolved = draft
        .fallbacks
        .iter()
        .find(|f| f.field == Field::ExportCountry);
    let message = match unresolved {
        Some(fallback) => format!(
            "Export country '{}' is not recognised; the 'other' distance will be used",
            fallback.raw
        ),
        None => "Export market without an export country; the 'other' distance will be used"
            .to_string(),
    };
    findings.push(ValidationError::warning(
        draft.source_row,
        Field::ExportCountry.code(),
        message,
    ));
}

fn fallback_warnings(draft: &DraftRow, findings: &mut Vec<ValidationError>) {
    for fallback in &draft.fallbacks {
        let message = match &fallback.used {
            Some(used) if used == &fallback.raw => {
                format!("'{}' is not a known {} code", fallback.raw, fallback.field)
            }
            Some(used) => format!(
                "'{}' is not a recognised {} value; using '{}'",
                fallback.raw, fallback.field, used
            ),
            // Covered by the export country warning.
            None if fallback.field == Field::ExportCountry
                && draft.market_type == Some(MarketType::Export) =>
            {
                continue
            }
            None => format!(
                "'{}' is not a recognised {} value and was ignored",
                fallback.raw, fallback.field
            ),
        };
        findings.push(ValidationError::warning(
            draft.source_row,
            fallback.field.code(),
            message,
        ));
    }
}

fn ambiguous_number_warnings(draft: &DraftRow, findings: &mut Vec<ValidationError>) {
    for number in &draft.ambiguous_numbers {
        let used = number.used.as_deref().unwrap_or_default();
        findings.push(ValidationError::warning(
            draft.source_row,
            number.field.code(),
            format!(
                "'{}' was read as {} with a decimal comma; write it without a separator if a \
                 thousands separator was meant",
                number.raw, used
            ),
        ));
    }
}

fn build_row(draft: &DraftRow, quantity: u32) -> Option<BulkProductRow> {
    Some(BulkProductRow {
        source_row: draft.source_row,
        sku: draft.sku.clone()?,
        product_name: draft.product_name.clone()?,
        product_type: draft.product_type?,
        quantity,
        weight_per_unit: draft.weight_per_unit.as_ref()?.value()?,
        primary_material: draft.primary_material.clone()?,
        primary_material_percentage: draft.primary_material_percentage.as_ref()?.value()?,
        secondary_material: draft.secondary_material.clone(),
        secondary_material_percentage: draft
            .secondary_material_percentage
            .as_ref()
            .and_then(NumericCell::value),
        accessories: draft.accessories.clone(),
        material_source: draft.material_source?,
        processes: draft.processes.clone(),
        energy_source: draft.energy_source,
        market_type: draft.market_type?,
        export_country: draft.export_country,
        transport_mode: draft.transport_mode,
    })
}

/// Duplicate detection key: trimmed, case-insensitive.
pub fn sku_key(sku: &str) -> String {
    sku.trim().to_lowercase()
}

fn duplicate_sku_warnings(
    rows: &[BulkProductRow],
    sku_rows: &BTreeMap<String, Vec<usize>>,
) -> Vec<ValidationError> {
    let mut warnings = Vec::new();
    for row in rows {
        let Some(group) = sku_rows.get(&sku_key(&row.sku)) else {
            continue;
        };
        if group.len() < 2 {
            continue;
        }
        let others: Vec<String> = group
            .iter()
            .filter(|&&r| r != row.source_row)
            .map(|r| r.to_string())
            .collect();
        warnings.push(ValidationError::warning(
            row.source_row,
            Field::Sku.code(),
            format!(
                "Duplicate SKU '{}' also appears in row(s) {}",
                row.sku.trim(),
                others.join(", ")
            ),
        ));
    }
    warnings
}

fn display_cell(cell: &NumericCell) -> String {
    match cell {
        NumericCell::Parsed(value) => value.normalize().to_string(),
        NumericCell::Invalid(raw) => raw.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, ExportCountry, Material, Process};
    use crate::validate::outcome::Severity;
    use rust_decimal_macros::dec;

    fn base_row() -> RawRow {
        [
            ("sku", "TS-001"),
            ("productName", "Basic tee"),
            ("productType", "tshirt"),
            ("quantity", "100"),
            ("weightPerUnit", "200"),
            ("primaryMaterial", "cotton"),
            ("primaryMaterialPercentage", "100"),
            ("materialSource", "domestic"),
            ("processes", "knitting, cutting"),
            ("energySource", "grid"),
            ("marketType", "export"),
            ("exportCountry", "eu"),
            ("transportMode", "sea"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
        .collect()
    }

    fn with(mut row: RawRow, key: &str, value: &str) -> RawRow {
        row.insert(key.to_string(), CellValue::from(value));
        row
    }

    #[test]
    fn test_clean_row_is_valid() {
        let result = validate_rows(&[base_row()]);
        assert!(result.is_valid);
        assert_eq!(result.valid_count, 1);
        assert_eq!(result.warning_count, 0);
        let row = &result.valid_rows[0];
        assert_eq!(row.source_row, 2);
        assert_eq!(row.quantity, 100);
        assert_eq!(row.weight_per_unit, dec!(200));
        assert_eq!(row.primary_material, Material::Cotton);
        assert_eq!(row.processes, vec![Process::Knitting, Process::CuttingSewing]);
        assert_eq!(row.export_country, Some(ExportCountry::Eu));
    }

    #[test]
    fn test_missing_required_field_rejects_row() {
        let mut row = base_row();
        row.remove("sku");
        let result = validate_rows(&[with(row, "energySource", "  ")]);
        assert!(!result.is_valid);
        assert_eq!(result.error_count, 1);
        assert!(result.valid_rows.is_empty());
        let invalid = &result.invalid_rows[0];
        assert_eq!(invalid.row, 2);
        let fields: Vec<&str> = invalid.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sku", "energySource"]);
        assert!(invalid.errors[0].message.contains("sku"));
    }

    #[test]
    fn test_zero_is_not_missing_but_is_invalid() {
        let result = validate_rows(&[with(base_row(), "quantity", "0")]);
        let errors = &result.invalid_rows[0].errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "quantity");
        assert!(errors[0].message.contains("positive whole number"));
    }

    #[test]
    fn test_fractional_and_text_quantity_rejected() {
        for bad in ["2.5", "-3", "many"] {
            let result = validate_rows(&[with(base_row(), "quantity", bad)]);
            assert_eq!(result.error_count, 1, "quantity {bad}");
        }
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let result = validate_rows(&[
            with(base_row(), "weightPerUnit", "0"),
            with(base_row(), "weightPerUnit", "heavy"),
        ]);
        assert_eq!(result.error_count, 2);
        assert_eq!(result.invalid_rows[1].row, 3);
    }

    #[test]
    fn test_percentage_sum_is_a_warning() {
        let row = with(base_row(), "primaryMaterialPercentage", "60");
        let row = with(row, "secondaryMaterial", "polyester");
        let row = with(row, "secondaryMaterialPercentage", "30");
        let result = validate_rows(&[row]);
        assert!(result.is_valid);
        assert_eq!(result.valid_count, 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, "materialPercentage");
        assert_eq!(result.warnings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_percentage_sum_within_tolerance() {
        let row = with(base_row(), "primaryMaterialPercentage", "65,0004");
        let row = with(row, "secondaryMaterial", "polyester");
        let row = with(row, "secondaryMaterialPercentage", "35");
        assert_eq!(validate_rows(&[row]).warning_count, 0);
    }

    #[test]
    fn test_out_of_range_percentage_is_an_error() {
        for bad in ["-10", "100.5", "1000000000000000000000"] {
            let result = validate_rows(&[with(base_row(), "primaryMaterialPercentage", bad)]);
            assert_eq!(result.error_count, 1, "percentage {bad}");
            let errors = &result.invalid_rows[0].errors;
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "primaryMaterialPercentage");
        }
    }

    #[test]
    fn test_implausible_row_is_rejected_not_calculated() {
        let row = with(base_row(), "weightPerUnit", "1000000000000");
        let row = with(row, "primaryMaterialPercentage", "1000000000000000000000");
        let row = with(row, "secondaryMaterial", "silk");
        let row = with(row, "secondaryMaterialPercentage", "1000000000000000000000");
        let result = validate_rows(&[row, with(base_row(), "weightPerUnit", "1000000")]);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.valid_count, 1);
        let fields: Vec<&str> = result.invalid_rows[0]
            .errors
            .iter()
            .map(|e| e.field.as_str())
            .collect();
        assert_eq!(
            fields,
            vec!["weightPerUnit", "primaryMaterialPercentage", "secondaryMaterialPercentage"]
        );
        assert!(result.invalid_rows[0].errors[0].message.contains("at most"));
    }

    #[test]
    fn test_non_numeric_percentage_is_an_error() {
        let result = validate_rows(&[with(base_row(), "primaryMaterialPercentage", "most")]);
        assert_eq!(result.error_count, 1);
        assert_eq!(
            result.invalid_rows[0].errors[0].field,
            "primaryMaterialPercentage"
        );
    }

    #[test]
    fn test_secondary_percentage_without_material() {
        let row = with(base_row(), "primaryMaterialPercentage", "80");
        let row = with(row, "secondaryMaterialPercentage", "20");
        let result = validate_rows(&[row]);
        assert!(result.is_valid);
        let fields: Vec<&str> = result.warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["secondaryMaterial"]);
    }

    #[test]
    fn test_export_without_country_is_a_warning() {
        let mut row = base_row();
        row.remove("exportCountry");
        let result = validate_rows(&[row]);
        assert!(result.is_valid);
        assert_eq!(result.warnings[0].field, "exportCountry");
    }

    #[test]
    fn test_unresolvable_export_country_quotes_raw_text() {
        let result = validate_rows(&[with(base_row(), "exportCountry", "Atlantis")]);
        assert!(result.is_valid);
        assert_eq!(result.warning_count, 1);
        assert!(result.warnings[0].message.contains("Atlantis"));
    }

    #[test]
    fn test_unusable_secondary_material_on_export_row_warns() {
        let row = with(base_row(), "primaryMaterialPercentage", "80");
        let row = with(row, "secondaryMaterial", "???");
        let row = with(row, "secondaryMaterialPercentage", "20");
        let result = validate_rows(&[row.clone(), with(row, "marketType", "domestic")]);
        let ignored: Vec<(usize, &str)> = result
            .warnings
            .iter()
            .filter(|w| w.message.contains("ignored"))
            .map(|w| (w.row, w.field.as_str()))
            .collect();
        assert_eq!(ignored, vec![(2, "secondaryMaterial"), (3, "secondaryMaterial")]);
    }

    #[test]
    fn test_possible_thousands_separator_warns() {
        let result = validate_rows(&[with(base_row(), "quantity", "1,000")]);
        assert!(result.is_valid);
        assert_eq!(result.valid_rows[0].quantity, 1);
        assert_eq!(result.warning_count, 1);
        assert_eq!(result.warnings[0].field, "quantity");
        assert!(result.warnings[0].message.contains("'1,000' was read as 1"));
    }

    #[test]
    fn test_unrecognised_material_accepted_with_warning() {
        let result = validate_rows(&[with(base_row(), "primaryMaterial", "sợi tre lạ")]);
        assert!(result.is_valid);
        assert_eq!(
            result.valid_rows[0].primary_material,
            Material::Other("soi_tre_la".into())
        );
        assert_eq!(result.warnings[0].field, "primaryMaterial");
    }

    #[test]
    fn test_duplicate_skus_flag_every_row() {
        let result = validate_rows(&[
            base_row(),
            with(base_row(), "sku", "other"),
            with(base_row(), "sku", "  ts-001 "),
        ]);
        assert_eq!(result.valid_count, 3);
        let dupes: Vec<usize> = result
            .warnings
            .iter()
            .filter(|w| w.field == "sku")
            .map(|w| w.row)
            .collect();
        assert_eq!(dupes, vec![2, 4]);
        assert!(result.warnings[0].message.contains('4'));
    }

    #[test]
    fn test_every_row_lands_once() {
        let mut missing = base_row();
        missing.remove("processes");
        let rows = vec![base_row(), missing, RawRow::new(), with(base_row(), "sku", "B")];
        let result = validate_rows(&rows);
        assert_eq!(result.total_rows, 4);
        assert_eq!(result.valid_count + result.error_count, result.total_rows);
        assert_eq!(result.valid_count, result.valid_rows.len());
        assert_eq!(result.error_count, result.invalid_rows.len());
    }

    #[test]
    fn test_invalid_row_keeps_partial_data() {
        let result = validate_rows(&[with(base_row(), "quantity", "lots")]);
        let data = &result.invalid_rows[0].data;
        assert_eq!(data.sku.as_deref(), Some("TS-001"));
        assert_eq!(data.quantity, Some(NumericCell::Invalid("lots".into())));
    }
}
