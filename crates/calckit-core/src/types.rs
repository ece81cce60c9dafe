use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values, in the caller's base currency unit.
pub type Money = Decimal;

/// Rates expressed as decimals (0.005 = 0.5% per period).
pub type Rate = Decimal;

/// Annual rates as the user types them (6 = 6% p.a.).
pub type Percent = Decimal;

/// Envelope returned by every calculator: the answer plus how it was reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap a result in the envelope. Assumptions that fail to serialise are
/// recorded as null.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            computation_time_us: elapsed_us,
            precision: "decimal_96bit_mantissa".to_string(),
        },
    }
}
