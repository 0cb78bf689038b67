use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent() // crates/
        .unwrap()
        .parent() // root
        .unwrap()
        .to_path_buf()
}

fn run_cli(input: &str, kind: &str, extra: &[&str]) -> Output {
    let data = project_root().join("test-pas-data");
    Command::new(env!("CARGO_BIN_EXE_pas-validator"))
        .arg("--spec")
        .arg(data.join("pas_lookup.csv"))
        .arg("--input")
        .arg(data.join(input))
        .args(["--kind", kind, "--no-progress"])
        .args(extra)
        .output()
        .expect("run pas-validator")
}

fn report(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is a JSON report")
}

#[test]
fn valid_file_exits_successfully() {
    let output = run_cli("gan_valid.tsv", "GAN", &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json = report(&output);
    assert_eq!(json["summary"]["recordKind"], "GAN");
    assert_eq!(json["summary"]["records"]["passed"], 2);
    assert_eq!(json["summary"]["counts"]["errors"], 0);
    assert_eq!(json["notices"].as_array().map(Vec::len), Some(0));
}

#[test]
fn invalid_file_reports_grouped_notices() {
    let output = run_cli("oan_invalid.tsv", "OAN", &["--threads", "2"]);
    assert_eq!(output.status.code(), Some(1));
    let json = report(&output);
    assert_eq!(json["summary"]["records"]["failed"], 6);
    assert_eq!(json["summary"]["counts"]["errors"], 6);
    assert_eq!(json["notices"][0]["code"], "ordered_pair_violated");
    assert_eq!(json["notices"][0]["sampleNotices"][0]["csvRowNumber"], 2);
}

#[test]
fn cutoff_date_flag_changes_date_gating() {
    let output = run_cli("gan_invalid.tsv", "GAN", &["--cutoff-date", "2020-01-01"]);
    let json = report(&output);
    assert_eq!(json["summary"]["sampleDateCutoff"], "2020-01-01");
    assert_eq!(json["summary"]["records"]["failed"], 4);
}

#[test]
fn report_can_be_written_to_file() {
    let path = std::env::temp_dir().join(format!("pas_report_{}.json", std::process::id()));
    let output = run_cli(
        "wan_valid.tsv",
        "WAN",
        &["--pretty", "--output", path.to_str().unwrap()],
    );
    assert!(output.status.success());
    let written = std::fs::read_to_string(&path).expect("report file");
    assert!(written.contains("\n  \"summary\""));
    let json: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["summary"]["records"]["total"], 1);
    std::fs::remove_file(&path).ok();
}

#[test]
fn unknown_kind_fails() {
    let output = run_cli("oan_valid.tsv", "PRD", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(report(&output)["notices"][0]["code"], "unknown_record_kind");
}

#[test]
fn bad_cutoff_date_is_rejected() {
    let output = run_cli("oan_valid.tsv", "OAN", &["--cutoff-date", "soon"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid --cutoff-date"));
}
