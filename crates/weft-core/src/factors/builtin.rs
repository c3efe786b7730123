use super::schema::FactorTable;
use std::sync::LazyLock;

const DEFAULT_FACTORS_JSON: &str = include_str!("../../../../factors/emission-factors.json");

static DEFAULT_TABLE: LazyLock<FactorTable> = LazyLock::new(|| {
    serde_json::from_str(DEFAULT_FACTORS_JSON).expect("embedded emission-factors.json is valid")
});

/// The factor table shipped with the crate.
pub fn default_table() -> &'static FactorTable {
    &DEFAULT_TABLE
}

/// Raw JSON of the shipped table, for `weft factors schema`.
pub fn default_table_json() -> &'static str {
    DEFAULT_FACTORS_JSON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::validate_factor_table;
    use crate::model::{EnergySource, Material, Process, TransportMode};
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_table_loads_and_validates() {
        let table = default_table();
        assert_eq!(table.name, "Textile default factors");
        validate_factor_table(table).unwrap();
    }

    #[test]
    fn test_every_known_code_has_a_factor() {
        let table = default_table();
        for code in Material::KNOWN_CODES {
            assert!(table.materials.contains_key(*code), "material {code}");
        }
        for code in Process::KNOWN_CODES {
            assert!(table.processes.contains_key(*code), "process {code}");
        }
        for source in EnergySource::ALL {
            assert!(table.energy.contains_key(source.code()));
            assert!(table.electricity.contains_key(source.code()));
        }
        for mode in TransportMode::ALL {
            assert!(table.transport.contains_key(mode.code()));
        }
    }

    #[test]
    fn test_defaults() {
        let d = &default_table().defaults;
        assert_eq!(d.material, dec!(5.5));
        assert_eq!(d.process, dec!(0.5));
        assert_eq!(d.energy, dec!(1.0));
        assert_eq!(d.transport, dec!(0.05));
        assert_eq!(d.distance_km, dec!(8000));
    }

    #[test]
    fn test_assessment_constants() {
        let a = &default_table().assessment;
        assert_eq!(a.material_proxy, dec!(6.0));
        assert_eq!(a.kwh_per_kg, dec!(2));
        assert_eq!(a.scope1_manufacturing_share, dec!(0.3));
        assert_eq!(a.proxy_energy_source, EnergySource::Grid);
        assert_eq!(a.proxy_transport_mode, TransportMode::Sea);
    }
}
