use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;
use weft_core::error::WeftError;
use weft_core::factors::{default_table, schema::FactorTable};

pub fn list() -> Result<(), WeftError> {
    let table = default_table();
    println!("{} (v{})\n", table.name, table.version);
    if let Some(ref desc) = table.description {
        println!("{}\n", desc);
    }

    print_section("Materials (kg CO2e/kg)", &table.materials);
    print_section("Material source multipliers", &table.material_sources);
    print_section("Processes (kg CO2e/kg)", &table.processes);
    print_section("Energy multipliers", &table.energy);
    print_section("Electricity (kg CO2e/kWh)", &table.electricity);
    print_section("Transport (per kg x 1000 km)", &table.transport);
    print_section("Market distances (km)", &table.market_distances_km);

    println!("Catalog materials:");
    for entry in &table.catalog {
        println!(
            "  {:<14} {:<34} {:<20} {}",
            entry.id,
            entry.name,
            entry.material,
            fmt_factor(entry.factor)
        );
    }
    println!();
    Ok(())
}

fn print_section(title: &str, factors: &BTreeMap<String, Decimal>) {
    println!("{title}:");
    for (code, value) in factors {
        println!("  {:<20} {}", code, fmt_factor(*value));
    }
    println!();
}

fn fmt_factor(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn explain() -> Result<(), WeftError> {
    let t = default_table();
    let d = &t.defaults;
    let a = &t.assessment;

    println!("How a bulk-import footprint is calculated (per unit, kg CO2e)\n");
    println!("  weight_kg      = weightPerUnit / 1000");
    println!("  materials      = weight_kg x (pct / 100) x material factor, summed over");
    println!("                   primary and secondary material, x material source multiplier");
    println!("                   (unknown materials use {})", fmt_factor(d.material));
    println!("  manufacturing  = weight_kg x sum(process factors) x energy multiplier");
    println!(
        "                   (unknown processes use {}, missing energy uses {})",
        fmt_factor(d.process),
        fmt_factor(d.energy)
    );
    println!("  transport      = weight_kg x (distance_km / 1000) x transport factor");
    println!(
        "                   (missing country uses {} km, missing mode uses {})",
        fmt_factor(d.distance_km),
        fmt_factor(d.transport)
    );
    println!("  total          = materials + manufacturing + transport, rounded to 3 places\n");

    println!("Scope and confidence:\n");
    println!("  start at scope1, score 50");
    println!("  processes and energy source given           -> scope1_2, +20");
    println!("  material shares and transport complete      -> scope1_2_3, +30");
    println!("  material source known                       -> +5");
    println!("  two or more processes                       -> +5");
    println!("  export with a destination country           -> +5");
    println!("  score capped at 100; >= 85 high, >= 65 medium, otherwise low\n");

    println!("Single-product assessment:\n");
    println!(
        "  catalog factor by id, else the material family factor, else {}",
        fmt_factor(a.material_proxy)
    );
    println!(
        "  energy = weight_kg x {} kWh/kg x electricity factor x share, {} if none declared",
        fmt_factor(a.kwh_per_kg),
        a.proxy_energy_source
    );
    println!(
        "  transport = sum over legs, else {} freight over the market distance",
        a.proxy_transport_mode
    );
    println!(
        "  scope1 = {}% of production, scope2 = energy, \
         scope3 = materials + transport + the rest of production",
        fmt_factor(a.scope1_manufacturing_share * Decimal::ONE_HUNDRED)
    );
    println!("  each proxy adds a note; proxies lower confidence to medium, non-catalog");
    println!("  materials or an unknown material source lower it to low\n");

    Ok(())
}

pub fn schema() -> Result<(), WeftError> {
    print!(
        r#"Factor Table Schema
===================

A factor table holds every emission factor and constant the calculations
use. Pass a custom table with `weft import --factors FILE` or
`weft assess --factors FILE`.

Top-level fields:
  name                 (string, required)  Human-readable table name
  description          (string, optional)  What the table is for
  version              (string, required)  Version identifier (e.g., "2024.1")
  materials            (object, required)  Material code -> kg CO2e per kg
  material_sources     (object, required)  domestic / imported / unknown -> multiplier
  processes            (object, required)  Process code -> kg CO2e per kg
  energy               (object, required)  Energy source -> manufacturing multiplier
  electricity          (object, required)  Energy source -> kg CO2e per kWh
  transport            (object, required)  Transport mode -> factor per kg x 1000 km
  market_distances_km  (object, required)  "domestic" or export country -> km
  defaults             (object, required)  material, process, energy, transport,
                                           distance_km: used when a code has no entry
  assessment           (object, required)  material_proxy, kwh_per_kg,
                                           generic_process, scope1_manufacturing_share
                                           (0-1), proxy_energy_source,
                                           proxy_transport_mode
  catalog              (array, optional)   Curated materials: id, name,
                                           material (family code), factor

All numbers are quoted strings to keep exact decimal precision
(e.g., "0.016" not 0.016). Factors must not be negative.

The shipped table:

{}
"#,
        weft_core::factors::builtin::default_table_json()
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), WeftError> {
    let table = weft_core::factors::load_factor_table(file)?;

    println!("Factor table '{}' (v{}) is valid.", table.name, table.version);
    println!(
        "  {} materials, {} processes, {} transport modes, {} catalog entries",
        table.materials.len(),
        table.processes.len(),
        table.transport.len(),
        table.catalog.len()
    );

    let warnings = coverage_warnings(&table);
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

/// Known codes the table leaves to the defaults.
fn coverage_warnings(table: &FactorTable) -> Vec<String> {
    use weft_core::model::{EnergySource, Material, Process, TransportMode};

    let mut warnings = Vec::new();
    for code in Material::KNOWN_CODES {
        if !table.materials.contains_key(*code) {
            warnings.push(format!("material '{code}' falls back to the default factor"));
        }
    }
    for code in Process::KNOWN_CODES {
        if !table.processes.contains_key(*code) {
            warnings.push(format!("process '{code}' falls back to the default factor"));
        }
    }
    for source in EnergySource::ALL {
        if !table.energy.contains_key(source.code()) {
            warnings.push(format!("energy source '{source}' falls back to the default multiplier"));
        }
    }
    for mode in TransportMode::ALL {
        if !table.transport.contains_key(mode.code()) {
            warnings.push(format!("transport mode '{mode}' falls back to the default factor"));
        }
    }
    for entry in &table.catalog {
        if Material::from_code(&entry.material).is_known() {
            continue;
        }
        warnings.push(format!(
            "catalog entry '{}' names unknown material '{}'",
            entry.id, entry.material
        ));
    }
    warnings
}
