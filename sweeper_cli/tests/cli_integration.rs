use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Small surface so a simulated sweep needs a dozen cycles
const VALID: &str = r#"
[surface]
height_mm = 300.0
width_mm = 560.0

[robot]
drive_speed_mm_s = 100.0
width_mm = 140.0

[cycle]
drive_ms = 1000
poll_ms = 10
"#;

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn sweeper(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sweeper").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run", "--sim-time"], 0, "sweep finished: 4 column(s)", "stdout")]
#[case(&["run", "--sim-time", "--max-cycles", "1"], 3, "sweep cycle limit", "stdout")]
#[case(&["run", "--sim-time", "--sim-sample", "20,17,44@2.5"], 0, "DETECTED copper", "stdout")]
#[case(&["run", "--sim-sample", "20,17@2.5"], 2, "exactly 3 components", "stderr")]
#[case(&["classify", "--signature", "20", "17", "44", "--amount", "2.5"], 0, "copper", "stdout")]
#[case(&["classify", "--signature", "20", "17", "44", "--amount", "1.0"], 0, "no match", "stdout")]
#[case(&["classify", "--signature", "20", "17", "--amount", "1.0"], 2, "", "stderr")]
#[case(&["self-check"], 0, "ok: 300 x 560 mm surface, 4 column(s), 15 substance(s)", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write(&dir, "cfg.toml", VALID);

    let mut cmd = sweeper(&dir);
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    if stream == "stdout" {
        assert.stdout(predicate::str::contains(needle));
    } else {
        assert.stderr(predicate::str::contains(needle));
    }
}

#[rstest]
fn json_run_report_is_machine_readable() {
    let dir = tempdir().unwrap();
    let cfg = write(&dir, "cfg.toml", VALID);
    let out = sweeper(&dir)
        .args(["--json", "--log-level", "error", "--config"])
        .arg(&cfg)
        .args(["run", "--sim-time", "--sim-sample", "20,18,44@11"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["outcome"], "finished");
    assert_eq!(v["columns"], 4);
    assert_eq!(v["detections"][0]["substance"], "lead");
    assert_eq!(v["detections"][0]["column"], 1);
}

#[rstest]
fn invalid_config_is_humanized() {
    let dir = tempdir().unwrap();
    let cfg = write(
        &dir,
        "bad.toml",
        r#"
[surface]
height_mm = 300.0
width_mm = 100.0

[robot]
drive_speed_mm_s = 100.0
width_mm = 140.0
"#,
    );
    sweeper(&dir)
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--sim-time"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("robot.width_mm must be < surface.width_mm"));
}

#[rstest]
fn missing_config_is_explained() {
    let dir = tempdir().unwrap();
    sweeper(&dir)
        .args(["run", "--sim-time"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not read the config file"));
}

#[rstest]
fn substance_csv_overrides_builtin_table() {
    let dir = tempdir().unwrap();
    let csv = write(
        &dir,
        "subs.csv",
        "name,s1,s2,s3,upper_limit,unit\nzinc,1,2,3,5.0,mg/L\n",
    );
    sweeper(&dir)
        .arg("--substances")
        .arg(&csv)
        .args(["classify", "--signature", "1", "2", "3", "--amount", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("zinc"));

    let out = sweeper(&dir)
        .arg("--json")
        .arg("--substances")
        .arg(&csv)
        .arg("substances")
        .output()
        .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v.as_array().map(Vec::len), Some(1));
}

#[rstest]
fn inline_table_from_config_is_used() {
    let dir = tempdir().unwrap();
    let cfg = write(
        &dir,
        "cfg.toml",
        &format!(
            "{VALID}\n[[substances]]\nname = \"tin\"\nsignature = [7.0, 8.0, 9.0]\nupper_limit = 1.0\nunit = \"mg/L\"\n"
        ),
    );
    sweeper(&dir)
        .arg("--config")
        .arg(&cfg)
        .args(["classify", "--signature", "20", "17", "44", "--amount", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no match"));
}

#[rstest]
fn bad_csv_header_is_reported() {
    let dir = tempdir().unwrap();
    let csv = write(&dir, "subs.csv", "substance,a,b,c,limit\nzinc,1,2,3,5\n");
    sweeper(&dir)
        .arg("--substances")
        .arg(&csv)
        .arg("substances")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid headers in substance CSV"));
}

#[rstest]
fn builtin_table_lists_fifteen_entries() {
    let dir = tempdir().unwrap();
    let out = sweeper(&dir).args(["--json", "substances"]).output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 15);
    assert_eq!(rows[0]["name"], "acrylamide");
}
