//! Batch estimation from CSV - one engine call per row
//!
//! Failure isolation lives here, not in the engine: a row that fails to
//! parse or validate is reported with its row number and the run moves
//! on (with `--skip-errors`) or stops. Sibling rows are always costed
//! independently; there is no shared state between iterations.

use console::style;
use csv::{ReaderBuilder, StringRecord};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::helpers::fmt_cost;
use crate::cli::GlobalOpts;
use crate::core::CostRecord;
use crate::engine::normalize::coerce_number;
use crate::engine::{
    estimate, CostInput, MakeBuy, PartInput, ProcessInput, RawMaterialInput,
};

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchModel {
    /// Raw-material rows
    Material,
    /// Purchased/manufactured part rows (make_buy column selects the path)
    Part,
    /// Process-operation rows
    Process,
}

#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// CSV file with one cost input per row
    #[arg(required_unless_present = "template")]
    pub file: Option<PathBuf>,

    /// Cost model the rows belong to
    #[arg(long, short = 'm', value_enum)]
    pub model: BatchModel,

    /// Continue past rows that fail to parse or validate
    #[arg(long)]
    pub skip_errors: bool,

    /// Print the expected CSV headers and an example row, then exit
    #[arg(long)]
    pub template: bool,

    /// Save costed records for the successful rows as YAML
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Per-run statistics
#[derive(Default)]
pub struct BatchStats {
    pub rows_processed: usize,
    pub rows_costed: usize,
    pub errors: usize,
}

pub fn run(args: BatchArgs, global: &GlobalOpts) -> Result<()> {
    if args.template {
        return print_template(args.model);
    }

    let Some(path) = args.file.as_ref() else {
        return Err(miette::miette!("no CSV file given (or use --template)"));
    };
    let file = File::open(path).into_diagnostic()?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    let mut stats = BatchStats::default();
    let mut records: Vec<CostRecord> = Vec::new();

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                stats.errors += 1;
                eprintln!("{} Row {}: CSV parse error: {}", style("✗").red(), row_num, e);
                if !args.skip_errors {
                    return Err(miette::miette!("CSV parse error at row {}: {}", row_num, e));
                }
                continue;
            }
        };

        let input = match build_input(args.model, &record, &header_map) {
            Ok(input) => input,
            Err(msg) => {
                stats.errors += 1;
                eprintln!("{} Row {}: {}", style("✗").red(), row_num, msg);
                if !args.skip_errors {
                    return Err(miette::miette!("row {}: {}", row_num, msg));
                }
                continue;
            }
        };

        match estimate(&input) {
            Ok(breakdown) => {
                stats.rows_costed += 1;
                if !global.quiet {
                    println!(
                        "{} Row {}: {} (total {})",
                        style("✓").green(),
                        row_num,
                        breakdown.subject(),
                        fmt_cost(breakdown.total_cost())
                    );
                }
                records.push(CostRecord::new(global.author.clone(), input, breakdown));
            }
            Err(e) => {
                stats.errors += 1;
                eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
                if !args.skip_errors {
                    return Err(e.into());
                }
            }
        }
    }

    if let Some(out_path) = args.output {
        let yaml = serde_yml::to_string(&records).into_diagnostic()?;
        fs::write(&out_path, yaml).into_diagnostic()?;
        if !global.quiet {
            eprintln!(
                "{} Saved {} record(s) to {}",
                style("✓").green(),
                records.len(),
                out_path.display()
            );
        }
    }

    if !global.quiet {
        eprintln!(
            "{} {} row(s): {} costed, {} error(s)",
            style("→").blue(),
            stats.rows_processed,
            stats.rows_costed,
            stats.errors
        );
    }

    if stats.errors > 0 && !args.skip_errors {
        return Err(miette::miette!("{} row(s) failed", stats.errors));
    }
    Ok(())
}

/// Build a map from header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a non-empty field value from a CSV record
fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A numeric cell that must be present
fn req_number(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> std::result::Result<f64, String> {
    let raw = get_field(record, header_map, field)
        .ok_or_else(|| format!("missing required field '{}'", field))?;
    coerce_number(&raw).ok_or_else(|| format!("field '{}' is not a number: \"{}\"", field, raw))
}

/// A numeric cell that may be absent or empty
fn opt_number(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> std::result::Result<Option<f64>, String> {
    match get_field(record, header_map, field) {
        None => Ok(None),
        Some(raw) => coerce_number(&raw)
            .map(Some)
            .ok_or_else(|| format!("field '{}' is not a number: \"{}\"", field, raw)),
    }
}

fn build_input(
    model: BatchModel,
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> std::result::Result<CostInput, String> {
    match model {
        BatchModel::Material => Ok(CostInput::RawMaterial(RawMaterialInput {
            material: get_field(record, header_map, "material")
                .ok_or("missing required field 'material'")?,
            category: get_field(record, header_map, "category"),
            location: get_field(record, header_map, "location"),
            uom: get_field(record, header_map, "uom"),
            unit_cost: req_number(record, header_map, "unit_cost")?,
            reclaim_rate: opt_number(record, header_map, "reclaim_rate")?,
            gross_usage: req_number(record, header_map, "gross_usage")?,
            net_usage: req_number(record, header_map, "net_usage")?,
            scrap_pct: opt_number(record, header_map, "scrap_pct")?,
            overhead_pct: opt_number(record, header_map, "overhead_pct")?,
        })),
        BatchModel::Part => Ok(CostInput::Part(PartInput {
            part: get_field(record, header_map, "part")
                .ok_or("missing required field 'part'")?,
            category: get_field(record, header_map, "category"),
            location: get_field(record, header_map, "location"),
            uom: get_field(record, header_map, "uom"),
            make_buy: match get_field(record, header_map, "make_buy") {
                Some(raw) => raw.parse::<MakeBuy>()?,
                None => MakeBuy::default(),
            },
            quantity: req_number(record, header_map, "quantity")?,
            unit_cost: opt_number(record, header_map, "unit_cost")?,
            freight_pct: opt_number(record, header_map, "freight_pct")?,
            duty_pct: opt_number(record, header_map, "duty_pct")?,
            overhead_pct: opt_number(record, header_map, "overhead_pct")?,
            raw_material_cost: opt_number(record, header_map, "raw_material_cost")?,
            process_cost: opt_number(record, header_map, "process_cost")?,
            scrap_pct: opt_number(record, header_map, "scrap_pct")?,
            defect_pct: opt_number(record, header_map, "defect_pct")?,
        })),
        BatchModel::Process => Ok(CostInput::ProcessOperation(ProcessInput {
            process: get_field(record, header_map, "process")
                .ok_or("missing required field 'process'")?,
            category: get_field(record, header_map, "category"),
            location: get_field(record, header_map, "location"),
            machine: get_field(record, header_map, "machine"),
            labor: get_field(record, header_map, "labor"),
            machine_rate: req_number(record, header_map, "machine_rate")?,
            labor_rate: req_number(record, header_map, "labor_rate")?,
            setup_manning: opt_number(record, header_map, "setup_manning")?,
            setup_time_min: opt_number(record, header_map, "setup_time_min")?,
            batch_size: opt_number(record, header_map, "batch_size")?,
            heads: opt_number(record, header_map, "heads")?,
            cycle_time_s: req_number(record, header_map, "cycle_time_s")?,
            parts_per_cycle: opt_number(record, header_map, "parts_per_cycle")?,
            scrap_pct: opt_number(record, header_map, "scrap_pct")?,
        })),
    }
}

fn print_template(model: BatchModel) -> Result<()> {
    let (headers, example) = template_columns(model);
    println!("{}", headers.join(","));
    println!("{}", example.join(","));

    // Hint to stderr so redirected output stays clean
    eprintln!();
    eprintln!(
        "{} Template generated. Redirect to file: shopcost batch --template --model {} > rows.csv",
        style("→").blue(),
        match model {
            BatchModel::Material => "material",
            BatchModel::Part => "part",
            BatchModel::Process => "process",
        }
    );
    Ok(())
}

fn template_columns(model: BatchModel) -> (&'static [&'static str], &'static [&'static str]) {
    match model {
        BatchModel::Material => (
            &[
                "material",
                "category",
                "location",
                "uom",
                "unit_cost",
                "reclaim_rate",
                "gross_usage",
                "net_usage",
                "scrap_pct",
                "overhead_pct",
            ],
            &[
                "AISI 4140",
                "steel",
                "Plant 2",
                "kg",
                "81.00",
                "0",
                "247.28",
                "156.50",
                "0",
                "0",
            ],
        ),
        BatchModel::Part => (
            &[
                "part",
                "category",
                "location",
                "uom",
                "make_buy",
                "quantity",
                "unit_cost",
                "freight_pct",
                "duty_pct",
                "overhead_pct",
                "raw_material_cost",
                "process_cost",
                "scrap_pct",
                "defect_pct",
            ],
            &[
                "M6 SHCS",
                "fastener",
                "",
                "ea",
                "buy",
                "5",
                "10.00",
                "10",
                "5",
                "0",
                "",
                "",
                "0",
                "0",
            ],
        ),
        BatchModel::Process => (
            &[
                "process",
                "category",
                "location",
                "machine",
                "labor",
                "machine_rate",
                "labor_rate",
                "setup_manning",
                "setup_time_min",
                "batch_size",
                "heads",
                "cycle_time_s",
                "parts_per_cycle",
                "scrap_pct",
            ],
            &[
                "CNC milling",
                "machining",
                "",
                "Haas VF-2",
                "machinist",
                "100",
                "50",
                "1",
                "0",
                "1",
                "1",
                "3600",
                "1",
                "0",
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_from(headers: &[&str], row: &[&str]) -> (StringRecord, HashMap<String, usize>) {
        let header_record = StringRecord::from(headers.to_vec());
        let map = build_header_map(&header_record);
        (StringRecord::from(row.to_vec()), map)
    }

    #[test]
    fn test_build_material_row_with_loose_numbers() {
        let (record, map) = record_from(
            &["material", "unit_cost", "gross_usage", "net_usage"],
            &["brass", "$12.50", "1,000", "750"],
        );
        let input = build_input(BatchModel::Material, &record, &map).unwrap();
        match input {
            CostInput::RawMaterial(m) => {
                assert_eq!(m.unit_cost, 12.5);
                assert_eq!(m.gross_usage, 1000.0);
            }
            _ => panic!("wrong model"),
        }
    }

    #[test]
    fn test_missing_required_field() {
        let (record, map) = record_from(&["material", "unit_cost"], &["brass", "12.5"]);
        let err = build_input(BatchModel::Material, &record, &map).unwrap_err();
        assert!(err.contains("gross_usage"));
    }

    #[test]
    fn test_non_numeric_cell() {
        let (record, map) = record_from(
            &["material", "unit_cost", "gross_usage", "net_usage"],
            &["brass", "cheap", "1", "1"],
        );
        let err = build_input(BatchModel::Material, &record, &map).unwrap_err();
        assert!(err.contains("unit_cost"));
    }

    #[test]
    fn test_part_row_defaults_to_buy() {
        let (record, map) = record_from(&["part", "quantity", "unit_cost"], &["bolt", "5", "10"]);
        let input = build_input(BatchModel::Part, &record, &map).unwrap();
        match input {
            CostInput::Part(p) => assert_eq!(p.make_buy, MakeBuy::Buy),
            _ => panic!("wrong model"),
        }
    }

    #[test]
    fn test_template_headers_cover_models() {
        for model in [BatchModel::Material, BatchModel::Part, BatchModel::Process] {
            let (headers, example) = template_columns(model);
            assert_eq!(headers.len(), example.len());
        }
    }
}
