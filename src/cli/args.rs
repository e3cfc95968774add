//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{batch::BatchArgs, estimate::EstimateArgs};

#[derive(Parser)]
#[command(name = "shopcost")]
#[command(author, version, about = "Manufacturing cost estimation")]
#[command(long_about = "Derives audit-traceable cost breakdowns for raw materials, purchased and manufactured parts, and machine/labor process operations. Every intermediate figure is reported, rounded once, at a fixed precision per value class.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Author recorded on saved cost records
    #[arg(long, global = true, env = "USER", default_value = "unknown")]
    pub author: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate one cost input from a YAML file
    Estimate(EstimateArgs),

    /// Estimate many inputs from a CSV file, one engine call per row
    Batch(BatchArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Breakdown as a field/value table
    #[default]
    Table,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
}
