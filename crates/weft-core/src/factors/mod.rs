pub mod builtin;
pub mod schema;

use crate::error::WeftError;
use crate::model::MaterialSource;
use rust_decimal::Decimal;
use schema::FactorTable;
use std::collections::HashSet;
use std::path::Path;

pub use builtin::default_table;

/// Load a factor table from a JSON file.
pub fn load_factor_table(path: &Path) -> Result<FactorTable, WeftError> {
    let content = std::fs::read_to_string(path).map_err(|e| WeftError::FactorTableLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_factor_table(&content, path)
}

/// Parse a factor table from a JSON string read from `source`.
pub fn parse_factor_table(json: &str, source: &Path) -> Result<FactorTable, WeftError> {
    let table: FactorTable = serde_json::from_str(json).map_err(|e| WeftError::FactorTableLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_factor_table(&table)?;
    Ok(table)
}

/// Parse a factor table from a JSON string (no file path context).
pub fn parse_factor_table_str(json: &str) -> Result<FactorTable, WeftError> {
    let table: FactorTable = serde_json::from_str(json)?;
    validate_factor_table(&table)?;
    Ok(table)
}

/// Check that a factor table is usable.
pub fn validate_factor_table(table: &FactorTable) -> Result<(), WeftError> {
    if table.name.trim().is_empty() {
        return Err(WeftError::FactorTableInvalid("name must not be empty".into()));
    }
    if table.version.trim().is_empty() {
        return Err(WeftError::FactorTableInvalid(
            "version must not be empty".into(),
        ));
    }

    let sections = [
        ("materials", &table.materials),
        ("material_sources", &table.material_sources),
        ("processes", &table.processes),
        ("energy", &table.energy),
        ("electricity", &table.electricity),
        ("transport", &table.transport),
        ("market_distances_km", &table.market_distances_km),
    ];
    for (section, factors) in sections {
        for (code, value) in factors {
            check_non_negative(&format!("{section}.{code}"), *value)?;
        }
    }

    let defaults = &table.defaults;
    for (name, value) in [
        ("defaults.material", defaults.material),
        ("defaults.process", defaults.process),
        ("defaults.energy", defaults.energy),
        ("defaults.transport", defaults.transport),
        ("defaults.distance_km", defaults.distance_km),
        ("assessment.material_proxy", table.assessment.material_proxy),
        ("assessment.kwh_per_kg", table.assessment.kwh_per_kg),
        ("assessment.generic_process", table.assessment.generic_process),
    ] {
        check_non_negative(name, value)?;
    }

    let share = table.assessment.scope1_manufacturing_share;
    if share.is_sign_negative() || share > Decimal::ONE {
        return Err(WeftError::FactorTableInvalid(format!(
            "assessment.scope1_manufacturing_share must be between 0 and 1, got {share}"
        )));
    }

    for code in table.material_sources.keys() {
        if MaterialSource::from_code(code).is_none() {
            return Err(WeftError::FactorTableInvalid(format!(
                "unknown material source '{}' (expected one of: domestic, imported, unknown)",
                code
            )));
        }
    }

    let mut seen = HashSet::new();
    for entry in &table.catalog {
        let id = entry.id.trim();
        if id.is_empty() {
            return Err(WeftError::FactorTableInvalid(format!(
                "catalog entry '{}' has an empty id",
                entry.name
            )));
        }
        if !seen.insert(id.to_lowercase()) {
            return Err(WeftError::FactorTableInvalid(format!(
                "duplicate catalog id '{}'",
                id
            )));
        }
        check_non_negative(&format!("catalog.{id}"), entry.factor)?;
    }

    Ok(())
}

fn check_non_negative(name: &str, value: Decimal) -> Result<(), WeftError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(WeftError::FactorTableInvalid(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal(extra: &str) -> String {
        format!(
            r#"{{
                "name": "Test",
                "version": "1",
                "materials": {{ "cotton": "8" }},
                "material_sources": {{ "domestic": "0.8" }},
                "processes": {{}},
                "energy": {{}},
                "electricity": {{ "grid": "0.5" }},
                "transport": {{}},
                "market_distances_km": {{}},
                "defaults": {{
                    "material": "5.5", "process": "0.5", "energy": "1",
                    "transport": "0.05", "distance_km": "8000"
                }},
                "assessment": {{
                    "material_proxy": "6", "kwh_per_kg": "2", "generic_process": "1",
                    "scope1_manufacturing_share": "0.3",
                    "proxy_energy_source": "grid", "proxy_transport_mode": "sea"
                }}
                {extra}
            }}"#
        )
    }

    #[test]
    fn test_parse_minimal_table() {
        let table = parse_factor_table_str(&minimal("")).unwrap();
        assert_eq!(table.name, "Test");
        assert!(table.catalog.is_empty());
    }

    #[test]
    fn test_negative_factor_rejected() {
        let json = minimal("").replace(r#""cotton": "8""#, r#""cotton": "-1""#);
        assert!(matches!(
            parse_factor_table_str(&json),
            Err(WeftError::FactorTableInvalid(_))
        ));
    }

    #[test]
    fn test_unknown_material_source_rejected() {
        let json = minimal("").replace(r#""domestic": "0.8""#, r#""offshore": "0.8""#);
        assert!(parse_factor_table_str(&json).is_err());
    }

    #[test]
    fn test_duplicate_catalog_id_rejected() {
        let json = minimal(
            r#", "catalog": [
                { "id": "A", "name": "one", "material": "cotton", "factor": "1" },
                { "id": "a", "name": "two", "material": "cotton", "factor": "2" }
            ]"#,
        );
        assert!(parse_factor_table_str(&json).is_err());
    }

    #[test]
    fn test_missing_defaults_rejected() {
        let json = r#"{ "name": "x", "version": "1", "materials": {} }"#;
        assert!(matches!(
            parse_factor_table_str(json),
            Err(WeftError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(minimal("").as_bytes()).unwrap();
        let table = load_factor_table(file.path()).unwrap();
        assert_eq!(table.version, "1");
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = load_factor_table(Path::new("/nonexistent/factors.json")).unwrap_err();
        assert!(matches!(err, WeftError::FactorTableLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/factors.json"));
    }
}
