use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("rack").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let exe = assert_cmd::cargo_bin!("rackdraw-cli");
    let output = Command::new(exe)
        .args(args)
        .output()
        .expect("run rackdraw-cli");
    assert!(output.status.success(), "{output:?}");
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn cli_parse_reports_positions_and_heights() {
    let path = fixture("mixed.json");
    let json = run_json(&["parse", path.to_string_lossy().as_ref()]);

    let devices = json["devices"].as_array().expect("devices");
    assert_eq!(devices.len(), 7);
    assert_eq!(devices[0]["top_unit"], 25);
    assert_eq!(devices[0]["height"], "1U");
    assert!(devices[3]["top_unit"].is_null());
    assert!(devices[3]["position_error"].is_string());
    assert_eq!(devices[4]["kind"], "storage");
    assert_eq!(devices[4]["height"], "2U");
    assert_eq!(devices[6]["height_defaulted"], true);
}

#[test]
fn cli_layout_prints_placements_and_diagnostics() {
    let path = fixture("mixed.json");
    let json = run_json(&["layout", "--pretty", path.to_string_lossy().as_ref()]);

    assert_eq!(json["kind"], "rack");
    assert_eq!(json["devices"].as_array().map(Vec::len), Some(4));
    let types: Vec<&str> = json["diagnostics"]
        .as_array()
        .expect("diagnostics")
        .iter()
        .filter_map(|d| d["type"].as_str())
        .collect();
    assert!(types.contains(&"rejected_placement"));
    assert!(types.contains(&"unparseable_position"));
    assert!(types.contains(&"unknown_model"));
}

#[test]
fn cli_renders_svg_to_stdout() {
    let exe = assert_cmd::cargo_bin!("rackdraw-cli");
    let output = Command::new(exe)
        .args([
            "render",
            "--width",
            "500",
            fixture("mixed.json").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run rackdraw-cli");
    assert!(output.status.success());

    let svg = String::from_utf8(output.stdout).expect("utf8");
    assert!(svg.starts_with(r#"<svg id="Row-A-Rack-3" width="500""#));
    assert!(svg.contains("Compute-1"));
}

#[test]
fn cli_reads_inventory_from_stdin() {
    let exe = assert_cmd::cargo_bin!("rackdraw-cli");
    let output = assert_cmd::Command::new(exe)
        .args(["render", "-"])
        .write_stdin("compute: []\nstorage: []\n")
        .output()
        .expect("run rackdraw-cli");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Rack layout unavailable"));
}

#[test]
fn cli_renders_png_with_default_out_path_for_file_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let tmp_fixture = tmp.path().join("rack.json");
    fs::copy(fixture("mixed.json"), &tmp_fixture).expect("copy fixture");

    let exe = assert_cmd::cargo_bin!("rackdraw-cli");
    Command::new(exe)
        .args([
            "render",
            "--format",
            "png",
            tmp_fixture.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let bytes = fs::read(tmp_fixture.with_extension("png")).expect("read png");
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "output is not a PNG"
    );
}

#[test]
fn cli_renders_pdf_with_assets_and_config() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("rack.pdf");

    let exe = assert_cmd::cargo_bin!("rackdraw-cli");
    Command::new(exe)
        .args([
            "render",
            "--format",
            "pdf",
            "--assets",
            tmp.path().to_string_lossy().as_ref(),
            "--config",
            fixture("overrides.yaml").to_string_lossy().as_ref(),
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("mixed.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let bytes = fs::read(&out).expect("read pdf");
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn cli_rejects_unknown_flags_with_usage() {
    let exe = assert_cmd::cargo_bin!("rackdraw-cli");
    Command::new(exe)
        .args(["render", "--format", "gif"])
        .assert()
        .code(2);
}

#[test]
fn cli_reports_malformed_inventory() {
    let exe = assert_cmd::cargo_bin!("rackdraw-cli");
    assert_cmd::Command::new(exe)
        .args(["layout"])
        .write_stdin("{ not json")
        .assert()
        .code(1);
}
