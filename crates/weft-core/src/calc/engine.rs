use crate::calc::outcome::{CalculatedRow, CarbonCalculationResult, ConfidenceLevel, Scope};
use crate::calc::round3;
use crate::factors::default_table;
use crate::factors::schema::FactorTable;
use crate::model::{BulkProductRow, MarketType, MaterialSource};
use crate::validate::engine::PERCENTAGE_TOLERANCE;
use rust_decimal::Decimal;

const BASE_SCORE: u32 = 50;
const MANUFACTURING_BONUS: u32 = 20;
const FULL_CHAIN_BONUS: u32 = 30;
const DETAIL_BONUS: u32 = 5;
const MAX_SCORE: u32 = 100;

/// Per-unit footprint of a row using the shipped factor table.
pub fn calculate(row: &BulkProductRow) -> CarbonCalculationResult {
    calculate_with(row, default_table())
}

/// Per-unit footprint of a row against an explicit factor table.
///
/// Materials, manufacturing and transport are computed exactly, then each is
/// rounded to 3 decimals. The total is the rounded sum of the unrounded parts.
/// Arithmetic saturates at `Decimal::MAX`, so rows that never went through
/// the validator cannot panic.
pub fn calculate_with(row: &BulkProductRow, table: &FactorTable) -> CarbonCalculationResult {
    let weight_kg = row.weight_per_unit / Decimal::ONE_THOUSAND;

    let materials = materials_co2(row, table, weight_kg);
    let manufacturing = manufacturing_co2(row, table, weight_kg);
    let transport = transport_co2(row, table, weight_kg);
    let total = materials
        .saturating_add(manufacturing)
        .saturating_add(transport);

    let (scope, confidence_score) = score(row);

    CarbonCalculationResult {
        materials_co2: round3(materials),
        manufacturing_co2: round3(manufacturing),
        transport_co2: round3(transport),
        total_co2: round3(total),
        scope,
        confidence_level: ConfidenceLevel::from_score(confidence_score),
        confidence_score,
    }
}

fn materials_co2(row: &BulkProductRow, table: &FactorTable, weight_kg: Decimal) -> Decimal {
    let share = |pct: Decimal| pct / Decimal::ONE_HUNDRED;

    let mut co2 = weight_kg
        .saturating_mul(share(row.primary_material_percentage))
        .saturating_mul(table.material_factor_or_default(&row.primary_material));

    if let (Some(material), Some(pct)) = (
        &row.secondary_material,
        row.secondary_material_percentage,
    ) {
        if pct > Decimal::ZERO {
            let secondary = weight_kg
                .saturating_mul(share(pct))
                .saturating_mul(table.material_factor_or_default(material));
            co2 = co2.saturating_add(secondary);
        }
    }

    co2.saturating_mul(table.source_factor(row.material_source))
}

fn manufacturing_co2(row: &BulkProductRow, table: &FactorTable, weight_kg: Decimal) -> Decimal {
    let process_total = row
        .processes
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(table.process_factor(p)));
    weight_kg
        .saturating_mul(process_total)
        .saturating_mul(table.energy_factor(row.energy_source))
}

/// Unit weight times distance in thousands of km times the mode factor.
fn transport_co2(row: &BulkProductRow, table: &FactorTable, weight_kg: Decimal) -> Decimal {
    let distance_km = table.distance_km(row.market_type, row.export_country);
    weight_kg
        .saturating_mul(distance_km / Decimal::ONE_THOUSAND)
        .saturating_mul(table.transport_factor(row.transport_mode))
}

/// Scope coverage and a 0-100 confidence score from data completeness.
///
/// The manufacturing and full-chain upgrades are independent and stack.
fn score(row: &BulkProductRow) -> (Scope, u32) {
    let mut scope = Scope::Scope1;
    let mut score = BASE_SCORE;

    if has_full_manufacturing_data(row) {
        scope = Scope::Scope1And2;
        score += MANUFACTURING_BONUS;
    }
    if has_full_material_data(row) && has_full_transport_data(row) {
        scope = Scope::Scope1To3;
        score += FULL_CHAIN_BONUS;
    }

    if row.material_source != MaterialSource::Unknown {
        score += DETAIL_BONUS;
    }
    if row.processes.len() >= 2 {
        score += DETAIL_BONUS;
    }
    if row.market_type == MarketType::Export && row.export_country.is_some() {
        score += DETAIL_BONUS;
    }

    (scope, score.min(MAX_SCORE))
}

fn is_hundred(pct: Decimal) -> bool {
    pct.saturating_sub(Decimal::ONE_HUNDRED).abs() <= PERCENTAGE_TOLERANCE
}

fn has_full_material_data(row: &BulkProductRow) -> bool {
    if is_hundred(row.primary_material_percentage) {
        return true;
    }
    match (&row.secondary_material, row.secondary_material_percentage) {
        (Some(_), Some(secondary)) => {
            is_hundred(row.primary_material_percentage.saturating_add(secondary))
        }
        _ => false,
    }
}

fn has_full_manufacturing_data(row: &BulkProductRow) -> bool {
    !row.processes.is_empty() && row.energy_source.is_some()
}

fn has_full_transport_data(row: &BulkProductRow) -> bool {
    row.transport_mode.is_some()
        && (row.market_type == MarketType::Domestic || row.export_country.is_some())
}

/// Calculate every row with the shipped factor table.
pub fn calculate_bulk_carbon(rows: &[BulkProductRow]) -> Vec<CalculatedRow> {
    calculate_bulk_carbon_with(rows, default_table())
}

pub fn calculate_bulk_carbon_with(
    rows: &[BulkProductRow],
    table: &FactorTable,
) -> Vec<CalculatedRow> {
    rows.iter()
        .map(|row| {
            let breakdown = calculate_with(row, table);
            CalculatedRow {
                row: row.clone(),
                calculated_co2: breakdown.total_co2,
                scope: breakdown.scope,
                confidence_level: breakdown.confidence_level,
                breakdown,
            }
        })
        .collect()
}
