//! Fixed-precision rounding - the engine's single rounding discipline
//!
//! Every numeric value that leaves the engine (echoed inputs and derived
//! stage outputs alike) is rounded to the decimal places of its value
//! class, and every stage output is rounded *before* the next stage
//! consumes it. Purchasers compare quotes stage-by-stage, so the rounded
//! intermediates are the contract, not an approximation of it.

use serde::{Deserialize, Serialize};

/// Value class determining reporting precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionClass {
    /// Monetary amounts (unit costs, stage costs, totals): 3 decimal places
    Cost,
    /// Hourly rates and derived hour figures: 4 decimal places
    Rate,
    /// Usages, quantities, times, counts: 2 decimal places
    Usage,
    /// Percentages and efficiency ratios: 2 decimal places
    Percentage,
}

impl PrecisionClass {
    /// Decimal places retained for this class
    pub fn decimals(&self) -> u32 {
        match self {
            PrecisionClass::Cost => 3,
            PrecisionClass::Rate => 4,
            PrecisionClass::Usage => 2,
            PrecisionClass::Percentage => 2,
        }
    }
}

/// Round a value to its class precision, half away from zero.
///
/// Implemented on the scaled integer (`round(v * 10^p) / 10^p`).
/// `f64::round` rounds halves away from zero, which is the required
/// convention; banker's rounding would diverge on tie values and must
/// not be substituted.
pub fn round_to(value: f64, class: PrecisionClass) -> f64 {
    let scale = 10f64.powi(class.decimals() as i32);
    (value * scale).round() / scale
}

/// Shorthand for [`PrecisionClass::Cost`] rounding
pub fn round_cost(value: f64) -> f64 {
    round_to(value, PrecisionClass::Cost)
}

/// Shorthand for [`PrecisionClass::Rate`] rounding
pub fn round_rate(value: f64) -> f64 {
    round_to(value, PrecisionClass::Rate)
}

/// Shorthand for [`PrecisionClass::Usage`] rounding
pub fn round_usage(value: f64) -> f64 {
    round_to(value, PrecisionClass::Usage)
}

/// Shorthand for [`PrecisionClass::Percentage`] rounding
pub fn round_pct(value: f64) -> f64 {
    round_to(value, PrecisionClass::Percentage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_decimals() {
        assert_eq!(PrecisionClass::Cost.decimals(), 3);
        assert_eq!(PrecisionClass::Rate.decimals(), 4);
        assert_eq!(PrecisionClass::Usage.decimals(), 2);
        assert_eq!(PrecisionClass::Percentage.decimals(), 2);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert!((round_usage(0.125) - 0.13).abs() < 1e-10);
        assert!((round_usage(-0.125) - (-0.13)).abs() < 1e-10);
        assert!((round_cost(1.2345) - 1.235).abs() < 1e-10);
        assert!((round_cost(-1.2345) - (-1.235)).abs() < 1e-10);
    }

    #[test]
    fn test_round_idempotent() {
        for class in [
            PrecisionClass::Cost,
            PrecisionClass::Rate,
            PrecisionClass::Usage,
            PrecisionClass::Percentage,
        ] {
            for v in [0.0, 1.23456789, -98.7654321, 20029.68, 0.005] {
                let once = round_to(v, class);
                let twice = round_to(once, class);
                assert!(
                    (once - twice).abs() < 1e-12,
                    "round not idempotent for {} at {:?}",
                    v,
                    class
                );
            }
        }
    }

    #[test]
    fn test_round_cost_three_places() {
        assert!((round_cost(20029.6799999) - 20029.68).abs() < 1e-9);
        assert!((round_cost(57.5) - 57.5).abs() < 1e-12);
    }

    #[test]
    fn test_round_rate_four_places() {
        // 1 second of cycle time in hours
        assert!((round_rate(1.0 / 3600.0) - 0.0003).abs() < 1e-12);
    }
}
