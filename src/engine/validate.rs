//! Input validation - closed-interval range checks and cross-field rules
//!
//! Every numeric field a model declares must sit inside its documented
//! `[min, max]` range before any stage arithmetic runs. Validation fails
//! fast on the first violation with the field name, the offending value,
//! and the allowed range; stage outputs are never re-validated (the
//! ranges bound raw inputs only).

use miette::Diagnostic;
use thiserror::Error;

/// A closed interval bound for one input field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRange {
    pub min: f64,
    pub max: f64,
}

impl ValidationRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check membership; error carries the field name and this range
    pub fn check(&self, field: &'static str, value: f64) -> Result<(), CostError> {
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(CostError::RangeViolation {
                field,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Structured validation failure taxonomy
///
/// Every variant is fatal to the call and fully recoverable by the
/// caller (fix the named input, retry). The engine never partially
/// computes: these are raised at the validator boundary, before any
/// stage runs.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum CostError {
    /// A single numeric field outside its documented range
    #[error("{field} = {value} is outside the allowed range [{min}, {max}]")]
    #[diagnostic(code(shopcost::validate::range))]
    RangeViolation {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Net usage exceeds gross usage (material model)
    #[error("net_usage = {net} exceeds gross_usage = {gross}")]
    #[diagnostic(
        code(shopcost::validate::inconsistent_usage),
        help("net usage is the material retained in the finished part; it can never exceed the gross amount consumed")
    )]
    InconsistentUsage { net: f64, gross: f64 },

    /// Reclaim rate exceeds the material unit cost (material model)
    #[error("reclaim_rate = {reclaim_rate} exceeds unit_cost = {unit_cost}")]
    #[diagnostic(
        code(shopcost::validate::reclaim_exceeds_unit_cost),
        help("scrap cannot recover more value per unit than the material cost in the first place")
    )]
    ReclaimExceedsUnitCost { reclaim_rate: f64, unit_cost: f64 },
}

impl CostError {
    /// The input field this error points at, for row-scoped reporting
    pub fn field(&self) -> &'static str {
        match self {
            CostError::RangeViolation { field, .. } => field,
            CostError::InconsistentUsage { .. } => "net_usage",
            CostError::ReclaimExceedsUnitCost { .. } => "reclaim_rate",
        }
    }
}

// Shared bounds. Percentage bounds that differ per model (part-level
// scrap/defect) live next to the model that owns them.
pub(crate) const MONEY: ValidationRange = ValidationRange::new(0.0, 1_000_000.0);
pub(crate) const USAGE: ValidationRange = ValidationRange::new(0.0, 1_000_000.0);
pub(crate) const QUANTITY: ValidationRange = ValidationRange::new(0.0, 1_000_000.0);
pub(crate) const PCT_0_100: ValidationRange = ValidationRange::new(0.0, 100.0);
pub(crate) const OVERHEAD_PCT: ValidationRange = ValidationRange::new(0.0, 500.0);
