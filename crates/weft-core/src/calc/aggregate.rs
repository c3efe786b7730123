use crate::calc::outcome::{
    AggregateStats, CalculatedRow, ConfidenceCounts, ConfidenceLevel, Scope, ScopeCounts,
};
use crate::calc::round3;
use rust_decimal::Decimal;

/// Batch totals over calculated rows.
///
/// Total CO2 is the sum of each row's per-unit result times its quantity;
/// the average is that total over the total quantity (zero for an empty
/// batch).
pub fn get_aggregate_stats(rows: &[CalculatedRow]) -> AggregateStats {
    let mut total_quantity: u64 = 0;
    let mut total_co2 = Decimal::ZERO;
    let mut by_confidence = ConfidenceCounts::default();
    let mut by_scope = ScopeCounts::default();

    for calculated in rows {
        let quantity = calculated.row.quantity;
        total_quantity += u64::from(quantity);
        total_co2 = total_co2
            .saturating_add(calculated.calculated_co2.saturating_mul(Decimal::from(quantity)));

        match calculated.confidence_level {
            ConfidenceLevel::High => by_confidence.high += 1,
            ConfidenceLevel::Medium => by_confidence.medium += 1,
            ConfidenceLevel::Low => by_confidence.low += 1,
        }
        match calculated.scope {
            Scope::Scope1 => by_scope.scope1 += 1,
            Scope::Scope1And2 => by_scope.scope1_2 += 1,
            Scope::Scope1To3 => by_scope.scope1_2_3 += 1,
        }
    }

    let average_co2_per_unit = if total_quantity == 0 {
        Decimal::ZERO
    } else {
        total_co2 / Decimal::from(total_quantity)
    };

    AggregateStats {
        total_products: rows.len(),
        total_quantity,
        total_co2: round3(total_co2),
        average_co2_per_unit: round3(average_co2_per_unit),
        by_confidence,
        by_scope,
    }
}
