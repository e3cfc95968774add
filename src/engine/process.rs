//! Process-operation cost model - machine and labor rate blending
//!
//! The calling layer resolves the selected machine and labor type to
//! hourly rates before invoking the engine; the engine never performs
//! catalog lookups. Setup cost amortizes over the batch, cycle cost
//! over the parts produced per cycle. `batch_size` and
//! `parts_per_cycle` are validated strictly positive, so the per-part
//! divisions can never divide by zero.

use serde::{Deserialize, Serialize};

use crate::engine::normalize::{flexible_f64, flexible_opt_f64};
use crate::engine::precision::{round_cost, round_pct, round_rate, round_usage};
use crate::engine::validate::{CostError, ValidationRange, PCT_0_100};

const SETUP_MANNING: ValidationRange = ValidationRange::new(0.0, 100.0);
const SETUP_TIME_MIN: ValidationRange = ValidationRange::new(0.0, 10_000.0);
const BATCH_SIZE: ValidationRange = ValidationRange::new(1.0, 1_000_000.0);
const HEADS: ValidationRange = ValidationRange::new(1.0, 64.0);
const CYCLE_TIME_S: ValidationRange = ValidationRange::new(0.0, 86_400.0);
const PARTS_PER_CYCLE: ValidationRange = ValidationRange::new(1.0, 1_000.0);
const MACHINE_RATE: ValidationRange = ValidationRange::new(0.0, 100_000.0);
const LABOR_RATE: ValidationRange = ValidationRange::new(0.0, 10_000.0);

/// Inputs for one machine/labor process operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInput {
    /// Operation name (e.g., "CNC milling, op 20")
    pub process: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Selected machine, resolved to `machine_rate` by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,

    /// Selected labor type, resolved to `labor_rate` by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor: Option<String>,

    /// Machine rate, currency per hour
    #[serde(deserialize_with = "flexible_f64")]
    pub machine_rate: f64,

    /// Labor rate, currency per hour
    #[serde(deserialize_with = "flexible_f64")]
    pub labor_rate: f64,

    /// Operators attending the setup
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub setup_manning: Option<f64>,

    /// Setup time, minutes
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub setup_time_min: Option<f64>,

    /// Parts per batch the setup amortizes over
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub batch_size: Option<f64>,

    /// Operators attending the running cycle
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub heads: Option<f64>,

    /// Cycle time, seconds
    #[serde(deserialize_with = "flexible_f64")]
    pub cycle_time_s: f64,

    /// Parallel cavities/stations producing parts per cycle
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub parts_per_cycle: Option<f64>,

    /// Scrap loading on the blended base cost
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub scrap_pct: Option<f64>,
}

impl ProcessInput {
    /// Range checks; `batch_size`, `heads` and `parts_per_cycle` are
    /// strictly positive so later divisions are safe
    pub fn validate(&self) -> Result<(), CostError> {
        MACHINE_RATE.check("machine_rate", self.machine_rate)?;
        LABOR_RATE.check("labor_rate", self.labor_rate)?;
        SETUP_MANNING.check("setup_manning", self.setup_manning.unwrap_or(1.0))?;
        SETUP_TIME_MIN.check("setup_time_min", self.setup_time_min.unwrap_or(0.0))?;
        BATCH_SIZE.check("batch_size", self.batch_size.unwrap_or(1.0))?;
        HEADS.check("heads", self.heads.unwrap_or(1.0))?;
        CYCLE_TIME_S.check("cycle_time_s", self.cycle_time_s)?;
        PARTS_PER_CYCLE.check("parts_per_cycle", self.parts_per_cycle.unwrap_or(1.0))?;
        PCT_0_100.check("scrap_pct", self.scrap_pct.unwrap_or(0.0))?;
        Ok(())
    }
}

/// Complete process-operation cost breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessBreakdown {
    // Normalized input echo
    pub process: String,
    pub category: String,
    pub location: String,
    pub machine: String,
    pub labor: String,
    pub machine_rate: f64,
    pub labor_rate: f64,
    pub setup_manning: f64,
    pub setup_time_min: f64,
    pub batch_size: f64,
    pub heads: f64,
    pub cycle_time_s: f64,
    pub parts_per_cycle: f64,
    pub scrap_pct: f64,

    // Stage outputs, in derivation order
    pub setup_cost_per_part: f64,
    pub cycle_time_hours: f64,
    pub labor_cost_per_cycle: f64,
    pub machine_cost_per_cycle: f64,
    pub total_cycle_cost_per_part: f64,
    pub base_cost: f64,
    pub scrap_cost: f64,
    pub total_cost: f64,
}

/// Run the process-operation model: validate, normalize, derive, assemble
pub fn estimate(input: &ProcessInput) -> Result<ProcessBreakdown, CostError> {
    input.validate()?;

    let machine_rate = round_rate(input.machine_rate);
    let labor_rate = round_rate(input.labor_rate);
    let setup_manning = round_usage(input.setup_manning.unwrap_or(1.0));
    let setup_time_min = round_usage(input.setup_time_min.unwrap_or(0.0));
    let batch_size = round_usage(input.batch_size.unwrap_or(1.0));
    let heads = round_usage(input.heads.unwrap_or(1.0));
    let cycle_time_s = round_usage(input.cycle_time_s);
    let parts_per_cycle = round_usage(input.parts_per_cycle.unwrap_or(1.0));
    let scrap_pct = round_pct(input.scrap_pct.unwrap_or(0.0));

    let setup_cost_per_part =
        round_cost(setup_manning * setup_time_min * labor_rate / (60.0 * batch_size));
    let cycle_time_hours = round_rate(cycle_time_s / 3600.0);
    let labor_cost_per_cycle = round_cost(cycle_time_hours * labor_rate * heads);
    let machine_cost_per_cycle = round_cost(cycle_time_hours * machine_rate);
    let total_cycle_cost_per_part =
        round_cost((labor_cost_per_cycle + machine_cost_per_cycle) / parts_per_cycle);
    let base_cost = round_cost(setup_cost_per_part + total_cycle_cost_per_part);
    let scrap_cost = round_cost(base_cost * scrap_pct / 100.0);
    let total_cost = round_cost(base_cost + scrap_cost).max(0.0);

    Ok(ProcessBreakdown {
        process: input.process.clone(),
        category: input.category.clone().unwrap_or_default(),
        location: input.location.clone().unwrap_or_default(),
        machine: input.machine.clone().unwrap_or_default(),
        labor: input.labor.clone().unwrap_or_default(),
        machine_rate,
        labor_rate,
        setup_manning,
        setup_time_min,
        batch_size,
        heads,
        cycle_time_s,
        parts_per_cycle,
        scrap_pct,
        setup_cost_per_part,
        cycle_time_hours,
        labor_cost_per_cycle,
        machine_cost_per_cycle,
        total_cycle_cost_per_part,
        base_cost,
        scrap_cost,
        total_cost,
    })
}
