use weft_core::calc::assessment::{AssessmentCarbonResult, EmissionBreakdown};
use weft_core::sku::ExistingSkuCheck;
use weft_core::validate::{ValidationError, ValidationResult};
use weft_core::ImportReport;

pub fn print_validation(result: &ValidationResult) {
    println!("=== Validation ===\n");
    println!(
        "  Rows: {} total, {} valid, {} invalid, {} warning(s)",
        result.total_rows, result.valid_count, result.error_count, result.warning_count
    );
    let status = if result.is_valid { "OK" } else { "REJECTED ROWS" };
    println!("  Status: {status}\n");

    if !result.invalid_rows.is_empty() {
        println!("  Invalid rows:");
        for invalid in &result.invalid_rows {
            let sku = invalid.data.sku.as_deref().unwrap_or("-");
            println!("    Row {} ({})", invalid.row, sku);
            for e in &invalid.errors {
                println!("      {:<22} {}", e.field, e.message);
            }
        }
        println!();
    }

    if !result.warnings.is_empty() {
        println!("  Warnings:");
        print_lines(result.warnings.iter());
        println!();
    }
}

pub fn print_import(report: &ImportReport) {
    print_validation(&report.validation);

    if let Some(ExistingSkuCheck::Unavailable { reason }) = &report.existing_skus {
        println!("  Existing SKU check skipped: {reason}\n");
    }
    if let Some(check) = &report.existing_skus {
        if !check.warnings().is_empty() {
            println!("  Already registered:");
            print_lines(check.warnings().iter());
            println!();
        }
    }

    if report.calculated.is_empty() {
        return;
    }

    println!("=== Footprint (kg CO2e per unit) ===\n");
    let sku_width = report
        .calculated
        .iter()
        .map(|c| c.row.sku.chars().count())
        .max()
        .unwrap_or(3)
        .max(3);

    println!(
        "  {:>4}  {:<sku_width$}  {:>9}  {:>9}  {:>9}  {:>9}  {:<10}  {}",
        "Row", "SKU", "Material", "Mfg", "Transport", "Total", "Scope", "Confidence"
    );
    for c in &report.calculated {
        let b = &c.breakdown;
        println!(
            "  {:>4}  {:<sku_width$}  {:>9}  {:>9}  {:>9}  {:>9}  {:<10}  {} ({})",
            c.row.source_row,
            c.row.sku,
            b.materials_co2.to_string(),
            b.manufacturing_co2.to_string(),
            b.transport_co2.to_string(),
            b.total_co2.to_string(),
            c.scope.to_string(),
            c.confidence_level,
            b.confidence_score
        );
    }
    println!();

    let s = &report.stats;
    println!("=== Batch ===\n");
    println!("  Products:         {}", s.total_products);
    println!("  Units:            {}", s.total_quantity);
    println!("  Total CO2e:       {} kg", s.total_co2);
    println!("  Average per unit: {} kg", s.average_co2_per_unit);
    println!(
        "  Confidence:       {} high, {} medium, {} low",
        s.by_confidence.high, s.by_confidence.medium, s.by_confidence.low
    );
    println!(
        "  Scope:            {} scope1, {} scope1_2, {} scope1_2_3",
        s.by_scope.scope1, s.by_scope.scope1_2, s.by_scope.scope1_2_3
    );
    println!();
}

/// Assessment findings, errors first.
pub fn print_findings(findings: &[ValidationError]) {
    if findings.is_empty() {
        return;
    }
    println!("=== Input check ===\n");
    let (errors, warnings): (Vec<_>, Vec<_>) = findings.iter().partition(|f| f.is_error());
    for f in errors.into_iter().chain(warnings) {
        println!("  {:<7} {:<18} {}", f.severity.to_string(), f.field, f.message);
    }
    println!();
}

pub fn print_assessment(result: &AssessmentCarbonResult) {
    println!("=== Assessment (kg CO2e) ===\n");
    println!("  {:<12} {:>12} {:>14}", "", "Per product", "Batch");
    print_breakdown_row("Materials", &result.per_product, &result.total_batch, |b| b.materials);
    print_breakdown_row("Production", &result.per_product, &result.total_batch, |b| b.production);
    print_breakdown_row("Energy", &result.per_product, &result.total_batch, |b| b.energy);
    print_breakdown_row("Transport", &result.per_product, &result.total_batch, |b| b.transport);
    print_breakdown_row("Total", &result.per_product, &result.total_batch, |b| b.total);
    println!();

    println!("  Scope 1: {}", result.scope1);
    println!("  Scope 2: {}", result.scope2);
    println!("  Scope 3: {}", result.scope3);
    println!("  Confidence: {}\n", result.confidence_level);

    if result.proxy_used {
        println!("  Proxies used:");
        for note in &result.proxy_notes {
            println!("    - {note}");
        }
        println!();
    }
}

fn print_breakdown_row(
    label: &str,
    per_product: &EmissionBreakdown,
    batch: &EmissionBreakdown,
    pick: fn(&EmissionBreakdown) -> rust_decimal::Decimal,
) {
    println!(
        "  {:<12} {:>12} {:>14}",
        label,
        pick(per_product).to_string(),
        pick(batch).to_string()
    );
}

fn print_lines<'a>(findings: impl Iterator<Item = &'a ValidationError>) {
    for w in findings {
        println!("    Row {:<4} {:<22} {}", w.row, w.field, w.message);
    }
}
