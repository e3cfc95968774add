//! Purchased/manufactured-part cost model
//!
//! Make/buy is a discriminant switch, not inheritance: the `make_buy`
//! field selects either the buy stage list (unit cost x quantity plus
//! freight/duty/overhead loading) or the make stage list (pre-computed
//! raw-material and process costs composed as opaque inputs). Both paths
//! converge on the same scrap/defect tail.

use serde::{Deserialize, Serialize};

use crate::engine::normalize::{flexible_f64, flexible_opt_f64, DEFAULT_UOM};
use crate::engine::precision::{round_cost, round_pct, round_usage};
use crate::engine::validate::{CostError, ValidationRange, MONEY, OVERHEAD_PCT, PCT_0_100, QUANTITY};

// Part-level scrap/defect carries a tighter bound than material scrap.
const PART_SCRAP_PCT: ValidationRange = ValidationRange::new(0.0, 50.0);
const PART_DEFECT_PCT: ValidationRange = ValidationRange::new(0.0, 50.0);
// Composed upstream figures can exceed single-material unit costs.
const COMPONENT_COST: ValidationRange = ValidationRange::new(0.0, 100_000_000.0);

/// Make or buy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MakeBuy {
    Make,
    Buy,
}

impl Default for MakeBuy {
    fn default() -> Self {
        MakeBuy::Buy
    }
}

impl std::fmt::Display for MakeBuy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MakeBuy::Make => write!(f, "make"),
            MakeBuy::Buy => write!(f, "buy"),
        }
    }
}

impl std::str::FromStr for MakeBuy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "make" => Ok(MakeBuy::Make),
            "buy" => Ok(MakeBuy::Buy),
            _ => Err(format!("Invalid make_buy value: {}. Use 'make' or 'buy'", s)),
        }
    }
}

/// Inputs for one purchased or manufactured part
///
/// The buy path consumes `unit_cost` and the freight/duty/overhead
/// loadings; the make path consumes `raw_material_cost` and
/// `process_cost`, which arrive pre-computed from the raw-material and
/// process models and are treated as opaque, already-rounded figures -
/// this model never re-derives them. Fields the selected path ignores
/// are not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartInput {
    /// Part name or number
    pub part: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,

    /// Make in-house or buy from a supplier
    #[serde(default)]
    pub make_buy: MakeBuy,

    /// Order/lot quantity for the extended cost
    #[serde(deserialize_with = "flexible_f64")]
    pub quantity: f64,

    /// Supplier unit cost (buy path)
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub unit_cost: Option<f64>,

    /// Freight loading on the base cost (buy path)
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub freight_pct: Option<f64>,

    /// Duty loading on the base cost (buy path)
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub duty_pct: Option<f64>,

    /// Overhead loading on base + freight + duty (buy path)
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub overhead_pct: Option<f64>,

    /// Pre-computed raw-material cost per part (make path)
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub raw_material_cost: Option<f64>,

    /// Pre-computed process cost per part (make path)
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub process_cost: Option<f64>,

    /// Scrap loading applied to the path subtotal
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub scrap_pct: Option<f64>,

    /// Defect loading applied after scrap
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub defect_pct: Option<f64>,
}

impl PartInput {
    /// Range checks over the fields the selected path consumes
    pub fn validate(&self) -> Result<(), CostError> {
        QUANTITY.check("quantity", self.quantity)?;
        match self.make_buy {
            MakeBuy::Buy => {
                MONEY.check("unit_cost", self.unit_cost.unwrap_or(0.0))?;
                PCT_0_100.check("freight_pct", self.freight_pct.unwrap_or(0.0))?;
                PCT_0_100.check("duty_pct", self.duty_pct.unwrap_or(0.0))?;
                OVERHEAD_PCT.check("overhead_pct", self.overhead_pct.unwrap_or(0.0))?;
            }
            MakeBuy::Make => {
                COMPONENT_COST.check("raw_material_cost", self.raw_material_cost.unwrap_or(0.0))?;
                COMPONENT_COST.check("process_cost", self.process_cost.unwrap_or(0.0))?;
            }
        }
        PART_SCRAP_PCT.check("scrap_pct", self.scrap_pct.unwrap_or(0.0))?;
        PART_DEFECT_PCT.check("defect_pct", self.defect_pct.unwrap_or(0.0))?;
        Ok(())
    }
}

/// Complete part cost breakdown for either path
///
/// Fields the selected path ignores are echoed at their default of 0 so
/// the record shape is identical for make and buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartBreakdown {
    // Normalized input echo
    pub part: String,
    pub category: String,
    pub location: String,
    pub uom: String,
    pub make_buy: MakeBuy,
    pub quantity: f64,
    pub unit_cost: f64,
    pub freight_pct: f64,
    pub duty_pct: f64,
    pub overhead_pct: f64,
    pub raw_material_cost: f64,
    pub process_cost: f64,
    pub scrap_pct: f64,
    pub defect_pct: f64,

    // Stage outputs, in derivation order
    pub base_cost: f64,
    pub freight_cost: f64,
    pub duty_cost: f64,
    pub overhead_cost: f64,
    pub subtotal: f64,
    pub scrap_adjustment: f64,
    pub defect_adjustment: f64,
    pub total_cost_per_part: f64,
    pub extended_cost: f64,
}

/// Run the part model: validate, normalize, derive buy or make stages,
/// then the common scrap/defect tail
pub fn estimate(input: &PartInput) -> Result<PartBreakdown, CostError> {
    input.validate()?;

    let quantity = round_usage(input.quantity);
    let scrap_pct = round_pct(input.scrap_pct.unwrap_or(0.0));
    let defect_pct = round_pct(input.defect_pct.unwrap_or(0.0));

    let (unit_cost, freight_pct, duty_pct, overhead_pct, raw_material_cost, process_cost) =
        match input.make_buy {
            MakeBuy::Buy => (
                round_cost(input.unit_cost.unwrap_or(0.0)),
                round_pct(input.freight_pct.unwrap_or(0.0)),
                round_pct(input.duty_pct.unwrap_or(0.0)),
                round_pct(input.overhead_pct.unwrap_or(0.0)),
                0.0,
                0.0,
            ),
            MakeBuy::Make => (
                0.0,
                0.0,
                0.0,
                0.0,
                round_cost(input.raw_material_cost.unwrap_or(0.0)),
                round_cost(input.process_cost.unwrap_or(0.0)),
            ),
        };

    let (base_cost, freight_cost, duty_cost, overhead_cost, subtotal) = match input.make_buy {
        MakeBuy::Buy => {
            let base_cost = round_cost(unit_cost * quantity);
            let freight_cost = round_cost(base_cost * freight_pct / 100.0);
            let mut subtotal = round_cost(base_cost + freight_cost);
            let duty_cost = round_cost(base_cost * duty_pct / 100.0);
            subtotal = round_cost(subtotal + duty_cost);
            let overhead_cost = round_cost(subtotal * overhead_pct / 100.0);
            subtotal = round_cost(subtotal + overhead_cost);
            (base_cost, freight_cost, duty_cost, overhead_cost, subtotal)
        }
        MakeBuy::Make => {
            let base_cost = round_cost(raw_material_cost + process_cost);
            (base_cost, 0.0, 0.0, 0.0, base_cost)
        }
    };

    let scrap_adjustment = round_cost(subtotal * scrap_pct / 100.0);
    let defect_adjustment = round_cost((subtotal + scrap_adjustment) * defect_pct / 100.0);
    let total_cost_per_part = round_cost(subtotal + scrap_adjustment + defect_adjustment);
    let extended_cost = round_cost(total_cost_per_part * quantity);

    Ok(PartBreakdown {
        part: input.part.clone(),
        category: input.category.clone().unwrap_or_default(),
        location: input.location.clone().unwrap_or_default(),
        uom: input.uom.clone().unwrap_or_else(|| DEFAULT_UOM.to_string()),
        make_buy: input.make_buy,
        quantity,
        unit_cost,
        freight_pct,
        duty_pct,
        overhead_pct,
        raw_material_cost,
        process_cost,
        scrap_pct,
        defect_pct,
        base_cost,
        freight_cost,
        duty_cost,
        overhead_cost,
        subtotal,
        scrap_adjustment,
        defect_adjustment,
        total_cost_per_part,
        extended_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn buy_input() -> PartInput {
        PartInput {
            part: "M6 socket head cap screw".to_string(),
            category: Some("fastener".to_string()),
            location: None,
            uom: None,
            make_buy: MakeBuy::Buy,
            quantity: 5.0,
            unit_cost: Some(10.0),
            freight_pct: Some(10.0),
            duty_pct: Some(5.0),
            overhead_pct: None,
            raw_material_cost: None,
            process_cost: None,
            scrap_pct: None,
            defect_pct: None,
        }
    }

    #[test]
    fn test_purchased_scenario() {
        let bd = estimate(&buy_input()).unwrap();
        assert!((bd.base_cost - 50.0).abs() < 1e-9);
        assert!((bd.freight_cost - 5.0).abs() < 1e-9);
        assert!((bd.duty_cost - 2.5).abs() < 1e-9);
        assert!((bd.overhead_cost - 0.0).abs() < 1e-9);
        assert!((bd.subtotal - 57.5).abs() < 1e-9);
        assert!((bd.total_cost_per_part - 57.5).abs() < 1e-9);
        assert!((bd.extended_cost - 287.5).abs() < 1e-9);
        assert_eq!(bd.uom, "ea");
    }

    #[test]
    fn test_buy_overhead_on_loaded_base() {
        let mut input = buy_input();
        input.overhead_pct = Some(10.0);
        let bd = estimate(&input).unwrap();
        // Overhead applies to base + freight + duty = 57.5
        assert!((bd.overhead_cost - 5.75).abs() < 1e-9);
        assert!((bd.subtotal - 63.25).abs() < 1e-9);
    }

    #[test]
    fn test_make_path_composes_upstream_costs() {
        let input = PartInput {
            part: "Machined housing".to_string(),
            category: None,
            location: None,
            uom: None,
            make_buy: MakeBuy::Make,
            quantity: 2.0,
            unit_cost: None,
            freight_pct: None,
            duty_pct: None,
            overhead_pct: None,
            raw_material_cost: Some(100.0),
            process_cost: Some(50.0),
            scrap_pct: Some(10.0),
            defect_pct: Some(10.0),
        };
        let bd = estimate(&input).unwrap();
        assert!((bd.base_cost - 150.0).abs() < 1e-9);
        assert_eq!(bd.freight_cost, 0.0);
        assert_eq!(bd.duty_cost, 0.0);
        assert_eq!(bd.overhead_cost, 0.0);
        assert!((bd.scrap_adjustment - 15.0).abs() < 1e-9);
        assert!((bd.defect_adjustment - 16.5).abs() < 1e-9);
        assert!((bd.total_cost_per_part - 181.5).abs() < 1e-9);
        assert!((bd.extended_cost - 363.0).abs() < 1e-9);
    }

    #[test]
    fn test_make_path_ignores_buy_fields() {
        let mut input = buy_input();
        input.make_buy = MakeBuy::Make;
        input.freight_pct = Some(999.0); // outside any bound, but not consumed
        input.raw_material_cost = Some(20.0);
        input.process_cost = Some(5.0);
        let bd = estimate(&input).unwrap();
        assert!((bd.base_cost - 25.0).abs() < 1e-9);
        assert_eq!(bd.freight_pct, 0.0);
        assert_eq!(bd.unit_cost, 0.0);
    }

    #[test]
    fn test_part_scrap_bound_is_tighter() {
        let mut input = buy_input();
        input.scrap_pct = Some(50.0);
        assert!(estimate(&input).is_ok());

        input.scrap_pct = Some(51.0);
        let err = estimate(&input).unwrap_err();
        assert_eq!(err.field(), "scrap_pct");

        input.scrap_pct = None;
        input.defect_pct = Some(50.1);
        let err = estimate(&input).unwrap_err();
        assert_eq!(err.field(), "defect_pct");
    }

    #[test]
    fn test_zero_quantity_extends_to_zero() {
        let mut input = buy_input();
        input.quantity = 0.0;
        let bd = estimate(&input).unwrap();
        assert_eq!(bd.base_cost, 0.0);
        assert_eq!(bd.extended_cost, 0.0);
        assert!(bd.total_cost_per_part >= 0.0);
    }

    #[test]
    fn test_make_buy_parsing() {
        assert_eq!(MakeBuy::from_str("make").unwrap(), MakeBuy::Make);
        assert_eq!(MakeBuy::from_str("BUY").unwrap(), MakeBuy::Buy);
        assert!(MakeBuy::from_str("lease").is_err());
        assert_eq!(MakeBuy::Make.to_string(), "make");
    }

    #[test]
    fn test_input_roundtrip() {
        let input = buy_input();
        let yaml = serde_yml::to_string(&input).unwrap();
        assert!(yaml.contains("make_buy: buy"));
        let parsed: PartInput = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(input, parsed);
    }
}
