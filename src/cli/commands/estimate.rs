//! Estimate one cost input from a YAML document

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{fmt_cost, fmt_pct, fmt_qty, fmt_rate};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::CostRecord;
use crate::engine::{estimate, CostBreakdown, CostInput};

#[derive(clap::Args, Debug)]
pub struct EstimateArgs {
    /// YAML file holding one cost input, tagged with `model:`
    pub input: PathBuf,

    /// Save the costed record (id, timestamp, input, breakdown) as YAML
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: EstimateArgs, global: &GlobalOpts) -> Result<()> {
    let text = fs::read_to_string(&args.input).into_diagnostic()?;
    let input: CostInput = serde_yml::from_str(&text)
        .map_err(|e| miette::miette!("{}: {}", args.input.display(), e))?;

    let breakdown = estimate(&input)?;

    match global.format {
        OutputFormat::Table => {
            if !global.quiet {
                println!(
                    "{} {} {} (total {})",
                    style("✓").green(),
                    input.model_name(),
                    breakdown.subject(),
                    fmt_cost(breakdown.total_cost())
                );
                println!();
            }
            print!("{}", render_table(&breakdown));
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&breakdown).into_diagnostic()?),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&breakdown).into_diagnostic()?
            )
        }
    }

    if let Some(path) = args.output {
        let record = CostRecord::new(global.author.clone(), input, breakdown);
        let yaml = serde_yml::to_string(&record).into_diagnostic()?;
        fs::write(&path, yaml).into_diagnostic()?;
        if !global.quiet {
            eprintln!(
                "{} Saved {} to {}",
                style("✓").green(),
                record.id,
                path.display()
            );
        }
    }

    Ok(())
}

/// Render every breakdown field as a field/value table, grouped
/// inputs / stages / ratios, in declaration order
pub(crate) fn render_table(breakdown: &CostBreakdown) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, value) in breakdown_rows(breakdown) {
        builder.push_record([field.to_string(), value]);
    }
    format!("{}\n", builder.build().with(Style::markdown()))
}

fn breakdown_rows(breakdown: &CostBreakdown) -> Vec<(&'static str, String)> {
    match breakdown {
        CostBreakdown::RawMaterial(bd) => vec![
            ("material", bd.material.clone()),
            ("category", bd.category.clone()),
            ("location", bd.location.clone()),
            ("uom", bd.uom.clone()),
            ("unit_cost", fmt_cost(bd.unit_cost)),
            ("reclaim_rate", fmt_cost(bd.reclaim_rate)),
            ("gross_usage", fmt_qty(bd.gross_usage)),
            ("net_usage", fmt_qty(bd.net_usage)),
            ("scrap_pct", fmt_pct(bd.scrap_pct)),
            ("overhead_pct", fmt_pct(bd.overhead_pct)),
            ("gross_material_cost", fmt_cost(bd.gross_material_cost)),
            ("scrap_amount", fmt_qty(bd.scrap_amount)),
            ("reclaim_value", fmt_cost(bd.reclaim_value)),
            ("net_material_cost", fmt_cost(bd.net_material_cost)),
            ("scrap_adjustment", fmt_cost(bd.scrap_adjustment)),
            ("subtotal", fmt_cost(bd.subtotal)),
            ("overhead_cost", fmt_cost(bd.overhead_cost)),
            ("total_cost", fmt_cost(bd.total_cost)),
            ("total_cost_per_unit", fmt_cost(bd.total_cost_per_unit)),
            (
                "effective_cost_per_unit",
                fmt_cost(bd.effective_cost_per_unit),
            ),
            (
                "material_utilization_rate",
                fmt_pct(bd.material_utilization_rate),
            ),
            ("scrap_rate", fmt_pct(bd.scrap_rate)),
            (
                "material_cost_percentage",
                fmt_pct(bd.material_cost_percentage),
            ),
            ("reclaim_percentage", fmt_pct(bd.reclaim_percentage)),
            (
                "overhead_percentage_of_total",
                fmt_pct(bd.overhead_percentage_of_total),
            ),
        ],
        CostBreakdown::Part(bd) => vec![
            ("part", bd.part.clone()),
            ("category", bd.category.clone()),
            ("location", bd.location.clone()),
            ("uom", bd.uom.clone()),
            ("make_buy", bd.make_buy.to_string()),
            ("quantity", fmt_qty(bd.quantity)),
            ("unit_cost", fmt_cost(bd.unit_cost)),
            ("freight_pct", fmt_pct(bd.freight_pct)),
            ("duty_pct", fmt_pct(bd.duty_pct)),
            ("overhead_pct", fmt_pct(bd.overhead_pct)),
            ("raw_material_cost", fmt_cost(bd.raw_material_cost)),
            ("process_cost", fmt_cost(bd.process_cost)),
            ("scrap_pct", fmt_pct(bd.scrap_pct)),
            ("defect_pct", fmt_pct(bd.defect_pct)),
            ("base_cost", fmt_cost(bd.base_cost)),
            ("freight_cost", fmt_cost(bd.freight_cost)),
            ("duty_cost", fmt_cost(bd.duty_cost)),
            ("overhead_cost", fmt_cost(bd.overhead_cost)),
            ("subtotal", fmt_cost(bd.subtotal)),
            ("scrap_adjustment", fmt_cost(bd.scrap_adjustment)),
            ("defect_adjustment", fmt_cost(bd.defect_adjustment)),
            ("total_cost_per_part", fmt_cost(bd.total_cost_per_part)),
            ("extended_cost", fmt_cost(bd.extended_cost)),
        ],
        CostBreakdown::ProcessOperation(bd) => vec![
            ("process", bd.process.clone()),
            ("category", bd.category.clone()),
            ("location", bd.location.clone()),
            ("machine", bd.machine.clone()),
            ("labor", bd.labor.clone()),
            ("machine_rate", fmt_rate(bd.machine_rate)),
            ("labor_rate", fmt_rate(bd.labor_rate)),
            ("setup_manning", fmt_qty(bd.setup_manning)),
            ("setup_time_min", fmt_qty(bd.setup_time_min)),
            ("batch_size", fmt_qty(bd.batch_size)),
            ("heads", fmt_qty(bd.heads)),
            ("cycle_time_s", fmt_qty(bd.cycle_time_s)),
            ("parts_per_cycle", fmt_qty(bd.parts_per_cycle)),
            ("scrap_pct", fmt_pct(bd.scrap_pct)),
            ("setup_cost_per_part", fmt_cost(bd.setup_cost_per_part)),
            ("cycle_time_hours", fmt_rate(bd.cycle_time_hours)),
            ("labor_cost_per_cycle", fmt_cost(bd.labor_cost_per_cycle)),
            ("machine_cost_per_cycle", fmt_cost(bd.machine_cost_per_cycle)),
            (
                "total_cycle_cost_per_part",
                fmt_cost(bd.total_cycle_cost_per_part),
            ),
            ("base_cost", fmt_cost(bd.base_cost)),
            ("scrap_cost", fmt_cost(bd.scrap_cost)),
            ("total_cost", fmt_cost(bd.total_cost)),
        ],
    }
}
