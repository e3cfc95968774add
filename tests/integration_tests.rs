//! Integration tests for the shopcost CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a shopcost command
fn shopcost() -> Command {
    Command::cargo_bin("shopcost").unwrap()
}

/// Helper to write a material input document
fn write_material_yaml(tmp: &TempDir) -> std::path::PathBuf {
    let path = tmp.path().join("material.yaml");
    fs::write(
        &path,
        "model: raw_material\n\
         material: AISI 4140\n\
         unit_cost: 81.00\n\
         gross_usage: 247.28\n\
         net_usage: 156.50\n",
    )
    .unwrap();
    path
}

#[test]
fn test_help_displays() {
    shopcost()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manufacturing cost estimation"));
}

#[test]
fn test_estimate_material_table() {
    let tmp = TempDir::new().unwrap();
    let path = write_material_yaml(&tmp);

    shopcost()
        .args(["estimate", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("gross_material_cost"))
        .stdout(predicate::str::contains("20029.680"))
        .stdout(predicate::str::contains("63.29%"));
}

#[test]
fn test_estimate_yaml_format() {
    let tmp = TempDir::new().unwrap();
    let path = write_material_yaml(&tmp);

    shopcost()
        .args(["estimate", path.to_str().unwrap(), "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("model: raw_material"))
        .stdout(predicate::str::contains("total_cost: 20029.68"));
}

#[test]
fn test_estimate_json_format() {
    let tmp = TempDir::new().unwrap();
    let path = write_material_yaml(&tmp);

    shopcost()
        .args(["estimate", path.to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"model\": \"raw_material\""))
        .stdout(predicate::str::contains("\"scrap_rate\": 36.71"));
}

#[test]
fn test_estimate_rejects_inconsistent_usage() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.yaml");
    fs::write(
        &path,
        "model: raw_material\nmaterial: steel\nunit_cost: 10\ngross_usage: 100\nnet_usage: 200\n",
    )
    .unwrap();

    shopcost()
        .args(["estimate", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("net_usage"))
        .stderr(predicate::str::contains("gross_usage"));
}

#[test]
fn test_estimate_saves_record() {
    let tmp = TempDir::new().unwrap();
    let path = write_material_yaml(&tmp);
    let record_path = tmp.path().join("record.yaml");

    shopcost()
        .args([
            "estimate",
            path.to_str().unwrap(),
            "-o",
            record_path.to_str().unwrap(),
            "--author",
            "estimator",
        ])
        .assert()
        .success();

    let saved = fs::read_to_string(&record_path).unwrap();
    assert!(saved.contains("id: MAT-"));
    assert!(saved.contains("author: estimator"));
    assert!(saved.contains("breakdown:"));
}

#[test]
fn test_estimate_process_scenario() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("op.yaml");
    fs::write(
        &path,
        "model: process_operation\n\
         process: CNC milling\n\
         machine_rate: 100\n\
         labor_rate: 50\n\
         cycle_time_s: 3600\n",
    )
    .unwrap();

    shopcost()
        .args(["estimate", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("total_cycle_cost_per_part"))
        .stdout(predicate::str::contains("150.000"));
}

#[test]
fn test_batch_skip_errors_isolates_rows() {
    let tmp = TempDir::new().unwrap();
    let csv_path = tmp.path().join("materials.csv");
    fs::write(
        &csv_path,
        "material,unit_cost,gross_usage,net_usage\n\
         steel,81.00,247.28,156.50\n\
         bad row,10,100,200\n\
         brass,12.50,4,3\n",
    )
    .unwrap();

    shopcost()
        .args([
            "batch",
            csv_path.to_str().unwrap(),
            "--model",
            "material",
            "--skip-errors",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Row 2: steel"))
        .stdout(predicate::str::contains("Row 4: brass"))
        .stderr(predicate::str::contains("Row 3"))
        .stderr(predicate::str::contains("2 costed, 1 error(s)"));
}

#[test]
fn test_batch_stops_without_skip_errors() {
    let tmp = TempDir::new().unwrap();
    let csv_path = tmp.path().join("materials.csv");
    fs::write(
        &csv_path,
        "material,unit_cost,gross_usage,net_usage\nbad row,10,100,200\n",
    )
    .unwrap();

    shopcost()
        .args(["batch", csv_path.to_str().unwrap(), "--model", "material"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("net_usage"));
}

#[test]
fn test_batch_saves_records() {
    let tmp = TempDir::new().unwrap();
    let csv_path = tmp.path().join("parts.csv");
    let out_path = tmp.path().join("records.yaml");
    fs::write(
        &csv_path,
        "part,make_buy,quantity,unit_cost,freight_pct,duty_pct\n\
         M6 SHCS,buy,5,10,10,5\n",
    )
    .unwrap();

    shopcost()
        .args([
            "batch",
            csv_path.to_str().unwrap(),
            "--model",
            "part",
            "-o",
            out_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("M6 SHCS"))
        .stdout(predicate::str::contains("57.500"));

    let saved = fs::read_to_string(&out_path).unwrap();
    assert!(saved.contains("id: PRT-"));
    assert!(saved.contains("extended_cost: 287.5"));
}

#[test]
fn test_batch_template() {
    shopcost()
        .args(["batch", "--template", "--model", "process"])
        .assert()
        .success()
        .stdout(predicate::str::contains("machine_rate,labor_rate"))
        .stdout(predicate::str::contains("cycle_time_s"));
}
