use crate::model::BulkProductRow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// GHG Protocol scope coverage of a footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "scope1")]
    Scope1,
    #[serde(rename = "scope1_2")]
    Scope1And2,
    #[serde(rename = "scope1_2_3")]
    Scope1To3,
}

impl Scope {
    pub fn code(&self) -> &'static str {
        match self {
            Scope::Scope1 => "scope1",
            Scope::Scope1And2 => "scope1_2",
            Scope::Scope1To3 => "scope1_2_3",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Bucket a 0-100 score: 85 and above is high, 65 and above medium.
    pub fn from_score(score: u32) -> ConfidenceLevel {
        if score >= 85 {
            ConfidenceLevel::High
        } else if score >= 65 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "high"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::Low => write!(f, "low"),
        }
    }
}

/// Per-unit footprint of one product, in kg CO2e, rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonCalculationResult {
    #[serde(rename = "materialsCO2")]
    pub materials_co2: Decimal,
    #[serde(rename = "manufacturingCO2")]
    pub manufacturing_co2: Decimal,
    #[serde(rename = "transportCO2")]
    pub transport_co2: Decimal,
    #[serde(rename = "totalCO2")]
    pub total_co2: Decimal,
    pub scope: Scope,
    pub confidence_level: ConfidenceLevel,
    /// 0-100.
    pub confidence_score: u32,
}

/// A validated row annotated with its calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedRow {
    #[serde(flatten)]
    pub row: BulkProductRow,
    /// Per-unit total, kg CO2e.
    #[serde(rename = "calculatedCO2")]
    pub calculated_co2: Decimal,
    pub scope: Scope,
    pub confidence_level: ConfidenceLevel,
    pub breakdown: CarbonCalculationResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeCounts {
    pub scope1: usize,
    pub scope1_2: usize,
    pub scope1_2_3: usize,
}

/// Batch totals over calculated rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_products: usize,
    pub total_quantity: u64,
    /// Sum of per-unit CO2 times quantity, kg CO2e.
    #[serde(rename = "totalCO2")]
    pub total_co2: Decimal,
    #[serde(rename = "averageCO2PerUnit")]
    pub average_co2_per_unit: Decimal,
    pub by_confidence: ConfidenceCounts,
    pub by_scope: ScopeCounts,
}
