//! Step-wise single-product assessment.
//!
//! Works over the richer state a product wizard collects: several material
//! entries that may point into the factor catalog, an energy mix, explicit
//! transport legs and a batch quantity. Every gap is filled with a proxy
//! factor, and each proxy leaves a note and lowers the confidence level.

use crate::calc::outcome::ConfidenceLevel;
use crate::calc::round3;
use crate::error::WeftError;
use crate::factors::default_table;
use crate::factors::schema::FactorTable;
use crate::model::{EnergySource, ExportCountry, MarketType, MaterialSource, TransportMode};
use crate::parsing::values::{parse_material, parse_processes};
use crate::validate::engine::{
    GENERAL_FIELD, MAX_PERCENTAGE, MAX_WEIGHT_PER_UNIT_GRAMS, PERCENTAGE_TOLERANCE,
};
use crate::validate::outcome::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Findings against an assessment are reported on this row.
pub const ASSESSMENT_ROW: usize = 1;

/// Longest plausible single transport leg, in km.
pub const MAX_LEG_DISTANCE_KM: Decimal = Decimal::from_parts(50_000, 0, 0, false, 0);

/// Largest batch an assessment accepts.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(u32::MAX, 0, 0, false, 0);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentInput {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity: Decimal,
    /// Grams per unit.
    pub weight_per_unit: Decimal,
    #[serde(default)]
    pub materials: Vec<MaterialEntry>,
    #[serde(default = "unknown_source")]
    pub material_source: MaterialSource,
    /// Free-text process names; mapped through the process dictionary.
    #[serde(default)]
    pub processes: Vec<String>,
    #[serde(default)]
    pub energy_sources: Vec<EnergyShare>,
    #[serde(default)]
    pub transport_legs: Vec<TransportLeg>,
    #[serde(default = "domestic_market")]
    pub market_type: MarketType,
    #[serde(default)]
    pub export_country: Option<ExportCountry>,
}

fn unknown_source() -> MaterialSource {
    MaterialSource::Unknown
}

fn domestic_market() -> MarketType {
    MarketType::Domestic
}

/// One material line. Catalog-linked entries carry `catalog_id`; entries the
/// user typed in carry only a name and/or a material code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialEntry {
    #[serde(default)]
    pub catalog_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    pub percentage: Decimal,
}

impl MaterialEntry {
    fn label(&self) -> String {
        self.name
            .as_deref()
            .or(self.material.as_deref())
            .or(self.catalog_id.as_deref())
            .unwrap_or("unnamed material")
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyShare {
    pub source: EnergySource,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportLeg {
    pub mode: TransportMode,
    pub distance_km: Decimal,
}

/// kg CO2e by life-cycle stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmissionBreakdown {
    pub materials: Decimal,
    pub production: Decimal,
    pub energy: Decimal,
    pub transport: Decimal,
    pub total: Decimal,
}

impl EmissionBreakdown {
    fn new(materials: Decimal, production: Decimal, energy: Decimal, transport: Decimal) -> Self {
        EmissionBreakdown {
            materials,
            production,
            energy,
            transport,
            total: materials
                .saturating_add(production)
                .saturating_add(energy)
                .saturating_add(transport),
        }
    }

    fn scaled(&self, factor: Decimal) -> Self {
        EmissionBreakdown::new(
            self.materials.saturating_mul(factor),
            self.production.saturating_mul(factor),
            self.energy.saturating_mul(factor),
            self.transport.saturating_mul(factor),
        )
    }

    fn rounded(&self) -> Self {
        EmissionBreakdown {
            materials: round3(self.materials),
            production: round3(self.production),
            energy: round3(self.energy),
            transport: round3(self.transport),
            total: round3(self.total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentCarbonResult {
    pub per_product: EmissionBreakdown,
    pub total_batch: EmissionBreakdown,
    /// Direct share of production, batch total.
    pub scope1: Decimal,
    /// Purchased energy, batch total.
    pub scope2: Decimal,
    /// Materials, transport and the indirect share of production, batch total.
    pub scope3: Decimal,
    pub proxy_used: bool,
    pub proxy_notes: Vec<String>,
    pub confidence_level: ConfidenceLevel,
}

/// Parse assessment JSON. Shape problems are `InvalidAssessment`.
pub fn parse_assessment_json(json: &str) -> Result<AssessmentInput, WeftError> {
    serde_json::from_str(json).map_err(|e| WeftError::InvalidAssessment(e.to_string()))
}

/// Check an assessment before calculating it. All findings are on row 1.
pub fn validate_assessment(input: &AssessmentInput) -> Vec<ValidationError> {
    let row = ASSESSMENT_ROW;
    let mut findings = Vec::new();

    if input.quantity <= Decimal::ZERO {
        findings.push(ValidationError::error(
            row,
            "quantity",
            "Quantity must be greater than zero",
        ));
    } else if input.quantity > MAX_QUANTITY {
        findings.push(ValidationError::error(
            row,
            "quantity",
            format!("Quantity must be at most {MAX_QUANTITY}"),
        ));
    }
    if input.weight_per_unit <= Decimal::ZERO {
        findings.push(ValidationError::error(
            row,
            "weightPerUnit",
            "Weight per unit must be greater than zero",
        ));
    } else if input.weight_per_unit > MAX_WEIGHT_PER_UNIT_GRAMS {
        findings.push(ValidationError::error(
            row,
            "weightPerUnit",
            format!("Weight per unit must be at most {MAX_WEIGHT_PER_UNIT_GRAMS} g"),
        ));
    }

    if input.materials.is_empty() {
        findings.push(ValidationError::error(
            row,
            "materials",
            "At least one material is required",
        ));
    } else if let Some(entry) = input.materials.iter().find(|m| !is_percentage(m.percentage)) {
        findings.push(ValidationError::error(
            row,
            "materials",
            format!(
                "Share of '{}' must be between 0 and 100, got {}",
                entry.label(),
                entry.percentage.normalize()
            ),
        ));
    } else {
        let sum = sum_percentages(input.materials.iter().map(|m| m.percentage));
        if !is_hundred(sum) {
            findings.push(ValidationError::warning(
                row,
                "materials",
                format!("Material percentages add up to {}%, expected 100%", sum.normalize()),
            ));
        }
    }

    if input.energy_sources.iter().any(|e| !is_percentage(e.percentage)) {
        findings.push(ValidationError::error(
            row,
            "energySources",
            "Energy shares must be between 0 and 100",
        ));
    } else if !input.energy_sources.is_empty() {
        let sum = sum_percentages(input.energy_sources.iter().map(|e| e.percentage));
        if !is_hundred(sum) {
            findings.push(ValidationError::error(
                row,
                "energySources",
                format!("Energy shares add up to {}%, expected 100%", sum.normalize()),
            ));
        }
    }

    for (idx, leg) in input.transport_legs.iter().enumerate() {
        if leg.distance_km.is_sign_negative() && !leg.distance_km.is_zero() {
            findings.push(ValidationError::error(
                row,
                "transportLegs",
                format!("Transport leg {} has a negative distance", idx + 1),
            ));
        } else if leg.distance_km > MAX_LEG_DISTANCE_KM {
            findings.push(ValidationError::error(
                row,
                "transportLegs",
                format!("Transport leg {} is longer than {MAX_LEG_DISTANCE_KM} km", idx + 1),
            ));
        }
    }

    if input.market_type == MarketType::Export && input.export_country.is_none() {
        findings.push(ValidationError::warning(
            row,
            GENERAL_FIELD,
            "Export market without an export country; the 'other' distance will be used",
        ));
    }

    findings
}

fn is_percentage(value: Decimal) -> bool {
    !value.is_sign_negative() && value <= MAX_PERCENTAGE
}

fn is_hundred(sum: Decimal) -> bool {
    sum.saturating_sub(Decimal::ONE_HUNDRED).abs() <= PERCENTAGE_TOLERANCE
}

fn sum_percentages(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Assess a product with the shipped factor table.
pub fn assess(input: &AssessmentInput) -> AssessmentCarbonResult {
    assess_with(input, default_table())
}

/// Assess a product against an explicit factor table.
///
/// Arithmetic saturates, so unvalidated magnitudes give huge results rather
/// than a panic.
pub fn assess_with(input: &AssessmentInput, table: &FactorTable) -> AssessmentCarbonResult {
    let weight_kg = input.weight_per_unit / Decimal::ONE_THOUSAND;
    let mut notes = ProxyNotes::default();

    let materials = materials_co2(input, table, weight_kg, &mut notes);
    let production = production_co2(input, table, weight_kg, &mut notes);
    let energy = energy_co2(input, table, weight_kg, &mut notes);
    let transport = transport_co2(input, table, weight_kg, &mut notes);

    let per_product = EmissionBreakdown::new(materials, production, energy, transport);
    let total_batch = per_product.scaled(input.quantity);

    let share = table.assessment.scope1_manufacturing_share;
    let scope1 = total_batch.production.saturating_mul(share);
    let scope2 = total_batch.energy;
    let scope3 = total_batch
        .materials
        .saturating_add(total_batch.transport)
        .saturating_add(total_batch.production.saturating_mul(Decimal::ONE - share));

    let unknown_source = input.material_source == MaterialSource::Unknown;
    let confidence_level = if notes.user_supplied || unknown_source {
        ConfidenceLevel::Low
    } else if notes.is_empty() {
        ConfidenceLevel::High
    } else {
        ConfidenceLevel::Medium
    };

    AssessmentCarbonResult {
        per_product: per_product.rounded(),
        total_batch: total_batch.rounded(),
        scope1: round3(scope1),
        scope2: round3(scope2),
        scope3: round3(scope3),
        proxy_used: !notes.is_empty(),
        proxy_notes: notes.notes,
        confidence_level,
    }
}

#[derive(Debug, Default)]
struct ProxyNotes {
    notes: Vec<String>,
    /// A material without a catalog match was involved.
    user_supplied: bool,
}

impl ProxyNotes {
    fn push(&mut self, note: String) {
        if !self.notes.contains(&note) {
            self.notes.push(note);
        }
    }

    fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Catalog factor by id, then the table factor for the material code, then
/// the generic proxy.
fn material_factor(entry: &MaterialEntry, table: &FactorTable, notes: &mut ProxyNotes) -> Decimal {
    if let Some(catalog) = entry.catalog_id.as_deref().and_then(|id| table.catalog_entry(id)) {
        return catalog.factor;
    }

    notes.user_supplied = true;
    let by_type = entry
        .material
        .as_deref()
        .and_then(parse_material)
        .and_then(|m| table.material_factor(&m).map(|f| (m, f)));

    match by_type {
        Some((material, factor)) => {
            notes.push(format!(
                "'{}' is not in the material catalog; using the average {} factor ({} kg CO2e/kg)",
                entry.label(),
                material,
                factor.normalize()
            ));
            factor
        }
        None => {
            let proxy = table.assessment.material_proxy;
            notes.push(format!(
                "'{}' could not be matched; using the generic material proxy ({} kg CO2e/kg)",
                entry.label(),
                proxy.normalize()
            ));
            proxy
        }
    }
}

fn materials_co2(
    input: &AssessmentInput,
    table: &FactorTable,
    weight_kg: Decimal,
    notes: &mut ProxyNotes,
) -> Decimal {
    let mut co2 = Decimal::ZERO;
    if input.materials.is_empty() {
        notes.user_supplied = true;
        notes.push(format!(
            "No materials declared; using the generic material proxy ({} kg CO2e/kg)",
            table.assessment.material_proxy.normalize()
        ));
        co2 = weight_kg.saturating_mul(table.assessment.material_proxy);
    }
    for entry in &input.materials {
        let factor = material_factor(entry, table, notes);
        let share = entry.percentage / Decimal::ONE_HUNDRED;
        co2 = co2.saturating_add(weight_kg.saturating_mul(share).saturating_mul(factor));
    }

    if input.material_source == MaterialSource::Unknown {
        notes.push("Material source unknown; no sourcing adjustment applied".to_string());
    }
    co2.saturating_mul(table.source_factor(input.material_source))
}

fn production_co2(
    input: &AssessmentInput,
    table: &FactorTable,
    weight_kg: Decimal,
    notes: &mut ProxyNotes,
) -> Decimal {
    let mut processes = Vec::new();
    for raw in &input.processes {
        for process in parse_processes(raw) {
            if !processes.contains(&process) {
                processes.push(process);
            }
        }
    }

    if processes.is_empty() {
        let proxy = table.assessment.generic_process;
        notes.push(format!(
            "No production processes declared; using a generic process factor ({} kg CO2e/kg)",
            proxy.normalize()
        ));
        return weight_kg.saturating_mul(proxy);
    }

    let mut total = Decimal::ZERO;
    for process in &processes {
        if !table.processes.contains_key(process.code()) {
            notes.push(format!(
                "Process '{}' has no factor; using the default ({} kg CO2e/kg)",
                process,
                table.defaults.process.normalize()
            ));
        }
        total = total.saturating_add(table.process_factor(process));
    }
    weight_kg.saturating_mul(total)
}

fn energy_co2(
    input: &AssessmentInput,
    table: &FactorTable,
    weight_kg: Decimal,
    notes: &mut ProxyNotes,
) -> Decimal {
    let kwh = weight_kg.saturating_mul(table.assessment.kwh_per_kg);

    if input.energy_sources.is_empty() {
        let source = table.assessment.proxy_energy_source;
        notes.push(format!(
            "No energy sources declared; assuming {} electricity at {} kWh/kg",
            source,
            table.assessment.kwh_per_kg.normalize()
        ));
        return kwh.saturating_mul(table.electricity_factor(source));
    }

    input.energy_sources.iter().fold(Decimal::ZERO, |acc, share| {
        let co2 = kwh
            .saturating_mul(table.electricity_factor(share.source))
            .saturating_mul(share.percentage / Decimal::ONE_HUNDRED);
        acc.saturating_add(co2)
    })
}

fn transport_co2(
    input: &AssessmentInput,
    table: &FactorTable,
    weight_kg: Decimal,
    notes: &mut ProxyNotes,
) -> Decimal {
    let tonnes = weight_kg / Decimal::ONE_THOUSAND;

    if input.transport_legs.is_empty() {
        let mode = table.assessment.proxy_transport_mode;
        let distance = table.distance_km(input.market_type, input.export_country);
        notes.push(format!(
            "No transport legs declared; assuming {} freight over {} km",
            mode,
            distance.normalize()
        ));
        return tonnes
            .saturating_mul(distance)
            .saturating_mul(table.transport_factor(Some(mode)));
    }

    input.transport_legs.iter().fold(Decimal::ZERO, |acc, leg| {
        let co2 = tonnes
            .saturating_mul(leg.distance_km)
            .saturating_mul(table.transport_factor(Some(leg.mode)));
        acc.saturating_add(co2)
    })
}
