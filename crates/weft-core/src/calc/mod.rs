pub mod aggregate;
pub mod assessment;
pub mod engine;
pub mod outcome;

use rust_decimal::{Decimal, RoundingStrategy};

pub use aggregate::get_aggregate_stats;
pub use assessment::{
    assess, assess_with, validate_assessment, AssessmentCarbonResult, AssessmentInput,
};
pub use engine::{calculate, calculate_bulk_carbon, calculate_bulk_carbon_with, calculate_with};
pub use outcome::{AggregateStats, CalculatedRow, CarbonCalculationResult, ConfidenceLevel, Scope};

/// Round to 3 decimal places, halves away from zero, trailing zeros dropped.
pub(crate) fn round3(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}
