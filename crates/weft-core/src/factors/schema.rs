use crate::model::{
    EnergySource, ExportCountry, MarketType, Material, MaterialSource, Process, TransportMode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emission factors and constants used by both calculation variants.
///
/// Factor maps are keyed by canonical code. Lookups that miss fall back to
/// `defaults`, so a table may cover only part of the code space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorTable {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    /// kg CO2e per kg of fibre.
    pub materials: BTreeMap<String, Decimal>,
    /// Multiplier on the material footprint by sourcing.
    pub material_sources: BTreeMap<String, Decimal>,
    /// kg CO2e per kg of product, per process.
    pub processes: BTreeMap<String, Decimal>,
    /// Multiplier on manufacturing by factory energy source.
    pub energy: BTreeMap<String, Decimal>,
    /// kg CO2e per kWh, used by the assessment variant.
    pub electricity: BTreeMap<String, Decimal>,
    /// Per kg x (km / 1000).
    pub transport: BTreeMap<String, Decimal>,
    /// Freight distance by market: `domestic` or an export country code.
    pub market_distances_km: BTreeMap<String, Decimal>,
    pub defaults: FactorDefaults,
    pub assessment: AssessmentConstants,
    #[serde(default)]
    pub catalog: Vec<CatalogMaterial>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorDefaults {
    pub material: Decimal,
    pub process: Decimal,
    pub energy: Decimal,
    pub transport: Decimal,
    pub distance_km: Decimal,
}

/// Constants of the step-wise assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConstants {
    /// Factor for materials found neither in the catalog nor by type code.
    pub material_proxy: Decimal,
    /// Assumed electricity use per kg of product.
    pub kwh_per_kg: Decimal,
    /// Process factor used when no process is declared.
    pub generic_process: Decimal,
    /// Share of production CO2 counted as direct (scope 1); the rest is scope 3.
    pub scope1_manufacturing_share: Decimal,
    pub proxy_energy_source: EnergySource,
    pub proxy_transport_mode: TransportMode,
}

/// A named material with a curated factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMaterial {
    pub id: String,
    pub name: String,
    /// Material family code.
    pub material: String,
    pub factor: Decimal,
}

impl FactorTable {
    /// Material factor, or `None` when the table has no entry for the code.
    pub fn material_factor(&self, material: &Material) -> Option<Decimal> {
        self.materials.get(material.code()).copied()
    }

    pub fn material_factor_or_default(&self, material: &Material) -> Decimal {
        self.material_factor(material)
            .unwrap_or(self.defaults.material)
    }

    pub fn source_factor(&self, source: MaterialSource) -> Decimal {
        self.material_sources
            .get(source.code())
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    pub fn process_factor(&self, process: &Process) -> Decimal {
        self.processes
            .get(process.code())
            .copied()
            .unwrap_or(self.defaults.process)
    }

    pub fn energy_factor(&self, source: Option<EnergySource>) -> Decimal {
        source
            .and_then(|s| self.energy.get(s.code()).copied())
            .unwrap_or(self.defaults.energy)
    }

    /// kg CO2e per kWh; unknown sources are priced as grid electricity.
    pub fn electricity_factor(&self, source: EnergySource) -> Decimal {
        self.electricity
            .get(source.code())
            .or_else(|| self.electricity.get(EnergySource::Grid.code()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn transport_factor(&self, mode: Option<TransportMode>) -> Decimal {
        mode.and_then(|m| self.transport.get(m.code()).copied())
            .unwrap_or(self.defaults.transport)
    }

    /// Freight distance for a market. Domestic sales use the `domestic`
    /// entry; exports use the country entry.
    pub fn distance_km(&self, market: MarketType, country: Option<ExportCountry>) -> Decimal {
        let key = match market {
            MarketType::Domestic => Some(MarketType::Domestic.code()),
            MarketType::Export => country.map(|c| c.code()),
        };
        key.and_then(|k| self.market_distances_km.get(k).copied())
            .unwrap_or(self.defaults.distance_km)
    }

    pub fn catalog_entry(&self, id: &str) -> Option<&CatalogMaterial> {
        let id = id.trim();
        self.catalog.iter().find(|c| c.id.eq_ignore_ascii_case(id))
    }
}

#[cfg(test)]
mod tests {
    use crate::factors::builtin::default_table;
    use crate::model::{EnergySource, ExportCountry, MarketType, Material, Process, TransportMode};
    use rust_decimal_macros::dec;

    #[test]
    fn test_known_lookups() {
        let t = default_table();
        assert_eq!(t.material_factor(&Material::Cotton), Some(dec!(8.0)));
        assert_eq!(t.process_factor(&Process::CuttingSewing), dec!(0.3));
        assert_eq!(t.energy_factor(Some(EnergySource::Solar)), dec!(0.2));
        assert_eq!(t.transport_factor(Some(TransportMode::Sea)), dec!(0.016));
        assert_eq!(t.electricity_factor(EnergySource::Grid), dec!(0.6766));
    }

    #[test]
    fn test_misses_fall_back_to_defaults() {
        let t = default_table();
        assert_eq!(
            t.material_factor_or_default(&Material::Other("soi_tre_la".into())),
            dec!(5.5)
        );
        assert_eq!(t.process_factor(&Process::Other("embroidery".into())), dec!(0.5));
        assert_eq!(t.energy_factor(None), dec!(1.0));
        assert_eq!(t.transport_factor(None), dec!(0.05));
    }

    #[test]
    fn test_distance_by_market() {
        let t = default_table();
        assert_eq!(t.distance_km(MarketType::Domestic, Some(ExportCountry::Us)), dec!(300));
        assert_eq!(t.distance_km(MarketType::Export, Some(ExportCountry::Eu)), dec!(10000));
        assert_eq!(t.distance_km(MarketType::Export, None), dec!(8000));
    }

    #[test]
    fn test_catalog_lookup_ignores_case() {
        let t = default_table();
        let entry = t.catalog_entry(" mat-cot-bci ").unwrap();
        assert_eq!(entry.factor, dec!(6.8));
        assert!(t.catalog_entry("MAT-NOPE").is_none());
    }
}
