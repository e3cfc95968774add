//! Raw-material cost model - gross/net usage, reclaim, waste and overhead loading
//!
//! Stage order is fixed and each stage output is rounded to its precision
//! class before the next stage consumes it. The resulting breakdown
//! carries every intermediate figure so a purchaser can audit the quote
//! stage-by-stage instead of trusting a single total.

use serde::{Deserialize, Serialize};

use crate::engine::guarded_div;
use crate::engine::normalize::{flexible_f64, flexible_opt_f64, DEFAULT_MATERIAL_UOM};
use crate::engine::precision::{round_cost, round_pct, round_usage};
use crate::engine::validate::{CostError, MONEY, OVERHEAD_PCT, PCT_0_100, USAGE};

/// Commercial and engineering inputs for one raw material
///
/// Identifying fields are opaque strings - the engine never validates
/// their content. Optional numeric fields default to 0; `uom` defaults
/// to kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMaterialInput {
    /// Material name (e.g., "AISI 4140 bar stock")
    pub material: String,

    /// Material category (e.g., "steel", "polymer")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Sourcing location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Unit of measure for usage figures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,

    /// Cost per unit of usage
    #[serde(deserialize_with = "flexible_f64")]
    pub unit_cost: f64,

    /// Recovery value per unit of scrap (resale of offcuts)
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub reclaim_rate: Option<f64>,

    /// Total material consumed per unit, including scrap
    #[serde(deserialize_with = "flexible_f64")]
    pub gross_usage: f64,

    /// Material retained in the finished part
    #[serde(deserialize_with = "flexible_f64")]
    pub net_usage: f64,

    /// Additional waste loading beyond the gross/net difference
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub scrap_pct: Option<f64>,

    /// Indirect cost loading (storage, purchasing, administration)
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub overhead_pct: Option<f64>,
}

/// Fully-populated, rounded inputs (the normalizer's output)
struct Normalized {
    material: String,
    category: String,
    location: String,
    uom: String,
    unit_cost: f64,
    reclaim_rate: f64,
    gross_usage: f64,
    net_usage: f64,
    scrap_pct: f64,
    overhead_pct: f64,
}

impl RawMaterialInput {
    /// Range and cross-field checks, first violation wins
    pub fn validate(&self) -> Result<(), CostError> {
        MONEY.check("unit_cost", self.unit_cost)?;
        MONEY.check("reclaim_rate", self.reclaim_rate.unwrap_or(0.0))?;
        USAGE.check("gross_usage", self.gross_usage)?;
        USAGE.check("net_usage", self.net_usage)?;
        PCT_0_100.check("scrap_pct", self.scrap_pct.unwrap_or(0.0))?;
        OVERHEAD_PCT.check("overhead_pct", self.overhead_pct.unwrap_or(0.0))?;

        if self.net_usage > self.gross_usage {
            return Err(CostError::InconsistentUsage {
                net: self.net_usage,
                gross: self.gross_usage,
            });
        }
        let reclaim = self.reclaim_rate.unwrap_or(0.0);
        if reclaim > self.unit_cost {
            return Err(CostError::ReclaimExceedsUnitCost {
                reclaim_rate: reclaim,
                unit_cost: self.unit_cost,
            });
        }
        Ok(())
    }

    fn normalize(&self) -> Normalized {
        Normalized {
            material: self.material.clone(),
            category: self.category.clone().unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            uom: self
                .uom
                .clone()
                .unwrap_or_else(|| DEFAULT_MATERIAL_UOM.to_string()),
            unit_cost: round_cost(self.unit_cost),
            reclaim_rate: round_cost(self.reclaim_rate.unwrap_or(0.0)),
            gross_usage: round_usage(self.gross_usage),
            net_usage: round_usage(self.net_usage),
            scrap_pct: round_pct(self.scrap_pct.unwrap_or(0.0)),
            overhead_pct: round_pct(self.overhead_pct.unwrap_or(0.0)),
        }
    }
}

/// Complete raw-material cost breakdown
///
/// Normalized input echo, then every stage output in derivation order,
/// then the efficiency ratios. Immutable once returned - callers that
/// need updated figures re-run the engine with new inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialBreakdown {
    // Normalized input echo
    pub material: String,
    pub category: String,
    pub location: String,
    pub uom: String,
    pub unit_cost: f64,
    pub reclaim_rate: f64,
    pub gross_usage: f64,
    pub net_usage: f64,
    pub scrap_pct: f64,
    pub overhead_pct: f64,

    // Stage outputs, in derivation order
    pub gross_material_cost: f64,
    pub scrap_amount: f64,
    pub reclaim_value: f64,
    pub net_material_cost: f64,
    pub scrap_adjustment: f64,
    pub subtotal: f64,
    pub overhead_cost: f64,
    pub total_cost: f64,
    pub total_cost_per_unit: f64,
    pub effective_cost_per_unit: f64,

    // Efficiency ratios
    pub material_utilization_rate: f64,
    pub scrap_rate: f64,
    pub material_cost_percentage: f64,
    pub reclaim_percentage: f64,
    pub overhead_percentage_of_total: f64,
}

/// Run the raw-material model: validate, normalize, derive, assemble
pub fn estimate(input: &RawMaterialInput) -> Result<MaterialBreakdown, CostError> {
    input.validate()?;
    let n = input.normalize();

    let gross_material_cost = round_cost(n.gross_usage * n.unit_cost);
    let scrap_amount = round_usage(n.gross_usage - n.net_usage);
    let reclaim_value = round_cost(scrap_amount * n.reclaim_rate);
    let net_material_cost = round_cost(gross_material_cost - reclaim_value);
    let scrap_adjustment = round_cost(net_material_cost * n.scrap_pct / 100.0);
    let subtotal = round_cost(net_material_cost + scrap_adjustment);
    let overhead_cost = round_cost(subtotal * n.overhead_pct / 100.0);
    let total_cost = round_cost(subtotal + overhead_cost);
    let total_cost_per_unit = round_cost(guarded_div(total_cost, n.gross_usage));
    let effective_cost_per_unit = round_cost(guarded_div(total_cost, n.net_usage));

    let material_utilization_rate = round_pct(guarded_div(n.net_usage, n.gross_usage) * 100.0);
    let scrap_rate = round_pct(guarded_div(n.gross_usage - n.net_usage, n.gross_usage) * 100.0);
    let material_cost_percentage =
        round_pct(guarded_div(gross_material_cost, total_cost) * 100.0);
    let reclaim_percentage = round_pct(guarded_div(reclaim_value, gross_material_cost) * 100.0);
    let overhead_percentage_of_total = round_pct(guarded_div(overhead_cost, total_cost) * 100.0);

    Ok(MaterialBreakdown {
        material: n.material,
        category: n.category,
        location: n.location,
        uom: n.uom,
        unit_cost: n.unit_cost,
        reclaim_rate: n.reclaim_rate,
        gross_usage: n.gross_usage,
        net_usage: n.net_usage,
        scrap_pct: n.scrap_pct,
        overhead_pct: n.overhead_pct,
        gross_material_cost,
        scrap_amount,
        reclaim_value,
        net_material_cost,
        scrap_adjustment,
        subtotal,
        overhead_cost,
        total_cost,
        total_cost_per_unit,
        effective_cost_per_unit,
        material_utilization_rate,
        scrap_rate,
        material_cost_percentage,
        reclaim_percentage,
        overhead_percentage_of_total,
    })
}
