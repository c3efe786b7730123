pub mod header;
pub mod normalize;
pub mod values;

use crate::error::WeftError;
use crate::model::{
    CellValue, EnergySource, ExportCountry, Field, MarketType, Material, MaterialSource, Process,
    ProductType, RawRow, TransportMode,
};
use header::map_header;
use normalize::{
    map_value, Dictionary, ENERGY_SOURCES, EXPORT_COUNTRIES, MARKET_TYPES, MATERIAL_SOURCES,
    PRODUCT_TYPES, TRANSPORT_MODES,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;
use values::{cell_to_decimal, is_ambiguous_comma, parse_list, parse_material, parse_processes};

/// Spreadsheet row number of the first data row (row 1 holds the headers).
pub const FIRST_DATA_ROW: usize = 2;

const NUMERIC_FIELDS: [Field; 4] = [
    Field::Quantity,
    Field::WeightPerUnit,
    Field::PrimaryMaterialPercentage,
    Field::SecondaryMaterialPercentage,
];

/// A numeric cell after parsing. Unparseable text is kept verbatim so the
/// validator can quote it back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumericCell {
    Parsed(Decimal),
    Invalid(String),
}

impl NumericCell {
    fn from_cell(cell: &CellValue) -> NumericCell {
        match cell_to_decimal(cell) {
            Some(value) => NumericCell::Parsed(value),
            None => NumericCell::Invalid(cell.as_text().unwrap_or_default()),
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            NumericCell::Parsed(v) => Some(*v),
            NumericCell::Invalid(_) => None,
        }
    }
}

/// A non-blank cell that no dictionary recognised, and what it became.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFallback {
    pub field: Field,
    pub raw: String,
    /// Code substituted for the raw text; `None` when the value was dropped.
    pub used: Option<String>,
}

/// A row rewritten to canonical fields, before validation.
///
/// Blank cells are `None` (or empty lists); everything non-blank has been
/// mapped, with unrecognised values degraded to defaults and recorded in
/// `fallbacks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRow {
    #[serde(skip)]
    pub source_row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<NumericCell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_per_unit: Option<NumericCell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_material: Option<Material>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_material_percentage: Option<NumericCell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_material: Option<Material>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_material_percentage: Option<NumericCell>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accessories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_source: Option<MaterialSource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub processes: Vec<Process>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_source: Option<EnergySource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_type: Option<MarketType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_country: Option<ExportCountry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<TransportMode>,
    #[serde(skip)]
    pub fallbacks: Vec<ValueFallback>,
    /// Numeric text where the comma may have been a thousands separator;
    /// `used` holds the decimal reading that was kept.
    #[serde(skip)]
    pub ambiguous_numbers: Vec<ValueFallback>,
    #[serde(skip)]
    pub unmapped_headers: Vec<String>,
}

/// Rewrite a raw spreadsheet row into canonical fields.
///
/// Headers are resolved through the header dictionary; unknown headers are
/// ignored. When two headers resolve to the same field, the first non-blank
/// cell wins.
pub fn map_row(raw: &RawRow, source_row: usize) -> DraftRow {
    let mut cells: BTreeMap<Field, &CellValue> = BTreeMap::new();
    let mut unmapped_headers = Vec::new();

    for (header, cell) in raw {
        match map_header(header) {
            Some(field) => {
                let occupied = cells.get(&field).is_some_and(|c| !c.is_blank());
                if !occupied {
                    cells.insert(field, cell);
                }
            }
            None => {
                debug!(row = source_row, header = %header, "ignoring unmapped column");
                unmapped_headers.push(header.clone());
            }
        }
    }

    let text = |field: Field| cells.get(&field).and_then(|c| c.as_text());
    let numeric = |field: Field| {
        cells
            .get(&field)
            .filter(|c| !c.is_blank())
            .map(|c| NumericCell::from_cell(c))
    };

    let mut fallbacks = Vec::new();

    let product_type = map_code(
        Field::ProductType,
        text(Field::ProductType),
        &PRODUCT_TYPES,
        ProductType::from_code,
        Some(ProductType::Other),
        &mut fallbacks,
    );
    let material_source = map_code(
        Field::MaterialSource,
        text(Field::MaterialSource),
        &MATERIAL_SOURCES,
        MaterialSource::from_code,
        Some(MaterialSource::Unknown),
        &mut fallbacks,
    );
    let energy_source = map_code(
        Field::EnergySource,
        text(Field::EnergySource),
        &ENERGY_SOURCES,
        EnergySource::from_code,
        Some(EnergySource::Grid),
        &mut fallbacks,
    );
    let market_type = map_code(
        Field::MarketType,
        text(Field::MarketType),
        &MARKET_TYPES,
        MarketType::from_code,
        Some(MarketType::Domestic),
        &mut fallbacks,
    );
    let export_country = map_code(
        Field::ExportCountry,
        text(Field::ExportCountry),
        &EXPORT_COUNTRIES,
        ExportCountry::from_code,
        None,
        &mut fallbacks,
    );
    let transport_mode = map_code(
        Field::TransportMode,
        text(Field::TransportMode),
        &TRANSPORT_MODES,
        TransportMode::from_code,
        Some(TransportMode::Multimodal),
        &mut fallbacks,
    );

    let primary_material =
        map_material(Field::PrimaryMaterial, text(Field::PrimaryMaterial), &mut fallbacks);
    let secondary_material =
        map_material(Field::SecondaryMaterial, text(Field::SecondaryMaterial), &mut fallbacks);

    let processes = text(Field::Processes)
        .map(|raw| parse_processes(&raw))
        .unwrap_or_default();
    for process in processes.iter().filter(|p| !p.is_known()) {
        fallbacks.push(ValueFallback {
            field: Field::Processes,
            raw: process.code().to_string(),
            used: Some(process.code().to_string()),
        });
    }

    let ambiguous_numbers = NUMERIC_FIELDS
        .iter()
        .filter_map(|&field| {
            let raw = match cells.get(&field)? {
                CellValue::Text(s) if is_ambiguous_comma(s) => s.trim().to_string(),
                _ => return None,
            };
            let used = numeric(field)?.value()?;
            Some(ValueFallback {
                field,
                raw,
                used: Some(used.normalize().to_string()),
            })
        })
        .collect();

    DraftRow {
        source_row,
        sku: text(Field::Sku),
        product_name: text(Field::ProductName),
        product_type,
        quantity: numeric(Field::Quantity),
        weight_per_unit: numeric(Field::WeightPerUnit),
        primary_material,
        primary_material_percentage: numeric(Field::PrimaryMaterialPercentage),
        secondary_material,
        secondary_material_percentage: numeric(Field::SecondaryMaterialPercentage),
        accessories: text(Field::Accessories)
            .map(|raw| parse_list(&raw))
            .unwrap_or_default(),
        material_source,
        processes,
        energy_source,
        market_type,
        export_country,
        transport_mode,
        fallbacks,
        ambiguous_numbers,
        unmapped_headers,
    }
}

/// Map a non-blank cell through a dictionary, degrading to `default` when
/// nothing matches.
fn map_code<T: fmt::Display>(
    field: Field,
    raw: Option<String>,
    dictionary: &Dictionary,
    from_code: fn(&str) -> Option<T>,
    default: Option<T>,
    fallbacks: &mut Vec<ValueFallback>,
) -> Option<T> {
    let raw = raw?;
    match from_code(map_value(&raw, dictionary, "")) {
        Some(value) => Some(value),
        None => {
            debug!(field = %field, raw = %raw, "value not recognised, using default");
            fallbacks.push(ValueFallback {
                field,
                raw,
                used: default.as_ref().map(|d| d.to_string()),
            });
            default
        }
    }
}

fn map_material(
    field: Field,
    raw: Option<String>,
    fallbacks: &mut Vec<ValueFallback>,
) -> Option<Material> {
    let raw = raw?;
    let material = parse_material(&raw);
    match &material {
        Some(m) if m.is_known() => {}
        other => fallbacks.push(ValueFallback {
            field,
            raw: raw.clone(),
            used: other.as_ref().map(|m| m.code().to_string()),
        }),
    }
    material
}

/// Parse a JSON array of flat objects into raw rows.
///
/// This is the one place malformed input is an error rather than a
/// validation finding: anything that is not a list of flat rows has no row
/// structure to report against.
pub fn parse_raw_rows_json(json: &str) -> Result<Vec<RawRow>, WeftError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let items = value
        .as_array()
        .ok_or_else(|| WeftError::InvalidShape("expected a JSON array of row objects".into()))?;

    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let object = item.as_object().ok_or_else(|| {
            WeftError::InvalidShape(format!("item {} is not an object", idx + 1))
        })?;

        let mut row = RawRow::new();
        for (key, cell) in object {
            let value = match cell {
                serde_json::Value::Null => CellValue::Blank,
                serde_json::Value::String(s) => CellValue::Text(s.clone()),
                serde_json::Value::Bool(b) => CellValue::Text(b.to_string()),
                serde_json::Value::Number(n) => match n.as_f64() {
                    Some(f) => CellValue::Number(f),
                    None => CellValue::Text(n.to_string()),
                },
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(WeftError::InvalidShape(format!(
                        "item {}: column '{}' holds a nested value",
                        idx + 1,
                        key
                    )));
                }
            };
            row.insert(key.clone(), value);
        }
        rows.push(row);
    }

    Ok(rows)
}
