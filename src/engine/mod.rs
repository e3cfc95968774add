//! Cost derivation engine
//!
//! A pure, stateless pipeline shared by three tagged cost models
//! (raw material, purchased/manufactured part, process operation):
//! validate against documented ranges, fill defaults, run the model's
//! ordered stage list with fixed-precision rounding at every stage
//! boundary, and assemble an audit-traceable breakdown. The engine
//! performs no I/O, holds no state between calls, and is safe to call
//! concurrently; rate lookups, persistence, and identity all belong to
//! the calling layer.

pub mod material;
pub mod normalize;
pub mod part;
pub mod precision;
pub mod process;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use material::{MaterialBreakdown, RawMaterialInput};
pub use part::{MakeBuy, PartBreakdown, PartInput};
pub use precision::{round_to, PrecisionClass};
pub use process::{ProcessBreakdown, ProcessInput};
pub use validate::{CostError, ValidationRange};

/// Division guard: denominators that validation allows to be zero
/// (usages, totals) yield 0 instead of raising. A record may
/// legitimately start from zero usage before materials are specified.
pub(crate) fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// One fully-typed calculation request, tagged by cost model
///
/// The part model covers both the purchased and manufactured cases; its
/// `make_buy` discriminant selects the stage list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum CostInput {
    RawMaterial(RawMaterialInput),
    Part(PartInput),
    ProcessOperation(ProcessInput),
}

impl CostInput {
    /// Human-readable model name for reporting
    pub fn model_name(&self) -> &'static str {
        match self {
            CostInput::RawMaterial(_) => "raw_material",
            CostInput::Part(input) => match input.make_buy {
                MakeBuy::Buy => "purchased_part",
                MakeBuy::Make => "manufactured_part",
            },
            CostInput::ProcessOperation(_) => "process_operation",
        }
    }
}

/// One costed, audit-traceable breakdown, tagged by cost model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum CostBreakdown {
    RawMaterial(MaterialBreakdown),
    Part(PartBreakdown),
    ProcessOperation(ProcessBreakdown),
}

impl CostBreakdown {
    /// The headline total for summary displays
    pub fn total_cost(&self) -> f64 {
        match self {
            CostBreakdown::RawMaterial(bd) => bd.total_cost,
            CostBreakdown::Part(bd) => bd.total_cost_per_part,
            CostBreakdown::ProcessOperation(bd) => bd.total_cost,
        }
    }

    /// The subject line (material/part/process name)
    pub fn subject(&self) -> &str {
        match self {
            CostBreakdown::RawMaterial(bd) => &bd.material,
            CostBreakdown::Part(bd) => &bd.part,
            CostBreakdown::ProcessOperation(bd) => &bd.process,
        }
    }
}

/// Run one calculation: validator, normalizer, stage list, assembler.
///
/// Returns the complete breakdown or the first validation failure;
/// the engine never returns a partial breakdown.
pub fn estimate(input: &CostInput) -> Result<CostBreakdown, CostError> {
    match input {
        CostInput::RawMaterial(input) => material::estimate(input).map(CostBreakdown::RawMaterial),
        CostInput::Part(input) => part::estimate(input).map(CostBreakdown::Part),
        CostInput::ProcessOperation(input) => {
            process::estimate(input).map(CostBreakdown::ProcessOperation)
        }
    }
}

/// Batch convenience: exactly [`estimate`] in a loop, one independent
/// result per input, no shared intermediate state between iterations
pub fn estimate_batch(inputs: &[CostInput]) -> Vec<Result<CostBreakdown, CostError>> {
    inputs.iter().map(estimate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material_input() -> CostInput {
        CostInput::RawMaterial(RawMaterialInput {
            material: "6061-T6 plate".to_string(),
            category: None,
            location: None,
            uom: None,
            unit_cost: 5.0,
            reclaim_rate: None,
            gross_usage: 2.0,
            net_usage: 1.5,
            scrap_pct: None,
            overhead_pct: None,
        })
    }

    #[test]
    fn test_dispatch_by_model_tag() {
        let yaml = "model: raw_material\nmaterial: brass\nunit_cost: 10\ngross_usage: 1\nnet_usage: 1\n";
        let input: CostInput = serde_yml::from_str(yaml).unwrap();
        let bd = estimate(&input).unwrap();
        assert!((bd.total_cost() - 10.0).abs() < 1e-9);
        assert_eq!(bd.subject(), "brass");
    }

    #[test]
    fn test_model_name_follows_make_buy() {
        let mut part = PartInput {
            part: "bracket".to_string(),
            category: None,
            location: None,
            uom: None,
            make_buy: MakeBuy::Buy,
            quantity: 1.0,
            unit_cost: Some(1.0),
            freight_pct: None,
            duty_pct: None,
            overhead_pct: None,
            raw_material_cost: None,
            process_cost: None,
            scrap_pct: None,
            defect_pct: None,
        };
        assert_eq!(CostInput::Part(part.clone()).model_name(), "purchased_part");
        part.make_buy = MakeBuy::Make;
        assert_eq!(
            CostInput::Part(part).model_name(),
            "manufactured_part"
        );
    }

    #[test]
    fn test_batch_matches_single_calls() {
        let good = material_input();
        let mut inner = match material_input() {
            CostInput::RawMaterial(i) => i,
            _ => unreachable!(),
        };
        inner.gross_usage = 100.0;
        inner.net_usage = 200.0;
        let bad = CostInput::RawMaterial(inner);

        let results = estimate_batch(&[good.clone(), bad.clone(), good.clone()]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], estimate(&good));
        assert_eq!(results[1], estimate(&bad));
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_breakdown_roundtrip() {
        let bd = estimate(&material_input()).unwrap();
        let yaml = serde_yml::to_string(&bd).unwrap();
        assert!(yaml.contains("model: raw_material"));
        let parsed: CostBreakdown = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(bd, parsed);
    }

    #[test]
    fn test_guarded_div() {
        assert_eq!(guarded_div(10.0, 0.0), 0.0);
        assert!((guarded_div(10.0, 4.0) - 2.5).abs() < 1e-12);
    }
}
