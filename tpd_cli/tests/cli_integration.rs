use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::{TempDir, tempdir};

// Instrument export with one ion channel at constant current and a
// temperature ramp of 1 K/s for `ramp_s` seconds, then flat. With
// integration smoothing disabled the full integral is analytic:
// current * (ramp span in Kelvin).
fn write_export(dir: &TempDir, name: &str, ramp_s: usize, flat_s: usize, current: f64) -> PathBuf {
    let n = ramp_s + flat_s;
    let mut out = String::new();
    for i in 1..=6 {
        out.push_str(&format!("Meta line {i}\n"));
    }
    out.push_str("m18\ttemp\n");
    out.push_str("Index\tTime\tValue\tIndex\tTime\tValue\n");
    for i in 0..=n {
        let t = i as f64;
        let temp = 100.0 + (i.min(ramp_s)) as f64;
        out.push_str(&format!(
            "{i}\t{t:.1}\t{current:.4}\t{i}\t{t:.1}\t{temp:.1}\n"
        ));
    }
    out.push_str("End of data\n");
    let path = dir.path().join(format!("{name}.txt"));
    fs::write(&path, out).unwrap();
    path
}

fn write_config(dir: &TempDir) -> PathBuf {
    let toml = r#"
[trimming]
target_slope = 1.0
tolerance = 0.3
# raw slopes keep the expected trim boundaries analytic
smoothing_enabled = false

[integration]
# keep the temperature axis raw so expected integrals stay analytic
smoothing_window = 1
left_window = [105.0, 115.0]
right_window = [115.0, 125.0]
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn tpd() -> Command {
    Command::cargo_bin("tpd").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["trim"], 2, "required", "stderr")]
#[case(&["ratio", "missing.txt"], 1, "window", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let mut cmd = tpd();
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.assert();
    let assert = if exit_code == 0 {
        assert.success()
    } else {
        assert.code(exit_code)
    };
    match stream {
        "stdout" => assert.stdout(predicate::str::contains(needle)),
        _ => assert.stderr(predicate::str::contains(needle)),
    };
}

#[test]
fn trim_reports_detected_region() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir);
    let file = write_export(&dir, "Xe_5K_1", 30, 40, 2.0);

    tpd()
        .arg("--config")
        .arg(&cfg)
        .arg("trim")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Xe_5K_1: linear region 1.000 s .. 30.000 s (30 rows)",
        ));
}

#[test]
fn trim_smooths_the_ramp_by_default() {
    let dir = tempdir().unwrap();
    let file = write_export(&dir, "Xe_5K_1", 30, 40, 2.0);

    // box filter of width 10 blurs the ramp corners: the first qualifying
    // smoothed slope sits at t = 6 and the run breaks at t = 30
    tpd()
        .arg("trim")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Xe_5K_1: linear region 6.000 s .. 29.000 s (24 rows)",
        ));
}

#[test]
fn trim_reports_missing_region_without_failing() {
    let dir = tempdir().unwrap();
    // flat ramp: nothing qualifies, but the command still succeeds
    let file = write_export(&dir, "Xe_5K_1", 0, 60, 2.0);

    tpd()
        .arg("trim")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Xe_5K_1: no linear region found"));
}

#[test]
fn integrate_json_yields_analytic_integrals() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir);
    let a = write_export(&dir, "Xe_2K_1", 30, 40, 2.0);
    let b = write_export(&dir, "Xe_4K_1", 30, 40, 4.0);

    let output = tpd()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("integrate")
        .arg(&a)
        .arg(&b)
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = v["integrals"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // trimmed range covers 101..130 K, so a constant current integrates
    // to current * 29
    assert_eq!(rows[0]["dosage"], 2.0);
    assert!((rows[0]["integral"].as_f64().unwrap() - 58.0).abs() < 1e-9);
    assert_eq!(rows[1]["dosage"], 4.0);
    assert!((rows[1]["integral"].as_f64().unwrap() - 116.0).abs() < 1e-9);
}

#[test]
fn ratio_of_constant_current_is_one_for_equal_windows() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir);
    let file = write_export(&dir, "Xe_5K_1", 30, 40, 3.0);

    let output = tpd()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("ratio")
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = v["ratios"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["dosage"], 5.0);
    assert!((rows[0]["ratio"].as_f64().unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn ratio_windows_can_come_from_flags() {
    let dir = tempdir().unwrap();
    let file = write_export(&dir, "Xe_5K_1", 30, 40, 3.0);

    tpd()
        .arg("--json")
        .arg("ratio")
        .arg(&file)
        .args(["--left", "105", "115", "--right", "115", "125"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dosage\": 5.0"));
}

#[test]
fn calibrate_fits_a_line_through_dose_response() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir);
    let files: Vec<PathBuf> = [(2.0, "Xe_2K_1"), (4.0, "Xe_4K_1"), (6.0, "Xe_6K_1")]
        .iter()
        .map(|&(current, name)| write_export(&dir, name, 30, 40, current))
        .collect();

    let output = tpd()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("calibrate")
        .args(&files)
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["model"], "linear");
    // integral = 29 * current and current == dosage here, so slope 29
    assert!((v["slope"].as_f64().unwrap() - 29.0).abs() < 1e-9);
    assert!(v["intercept"].as_f64().unwrap().abs() < 1e-9);
    assert_eq!(v["points"].as_array().unwrap().len(), 3);
}

#[test]
fn calibrate_piecewise_converges_on_window_ratios() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir);
    let files: Vec<PathBuf> = ["Xe_1K_1", "Xe_2K_1", "Xe_4K_1", "Xe_8K_1"]
        .iter()
        .map(|name| write_export(&dir, name, 30, 40, 3.0))
        .collect();

    tpd()
        .arg("--config")
        .arg(&cfg)
        .arg("calibrate")
        .arg("--piecewise")
        .args(&files)
        .assert()
        .success()
        .stdout(predicate::str::contains("piecewise fit over 4 point(s)"));
}

#[test]
fn malformed_file_is_skipped_with_a_warning() {
    let dir = tempdir().unwrap();
    let good = write_export(&dir, "Xe_5K_1", 30, 40, 2.0);
    let junk = dir.path().join("Xe_9K_1.txt");
    fs::write(&junk, "not an export\n").unwrap();

    tpd()
        .arg("trim")
        .arg(&junk)
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("Xe_5K_1: linear region"))
        .stderr(predicate::str::contains("cannot parse file"));
}

#[test]
fn empty_batch_fails() {
    let dir = tempdir().unwrap();
    let junk = dir.path().join("Xe_9K_1.txt");
    fs::write(&junk, "not an export\n").unwrap();

    tpd()
        .arg("trim")
        .arg(&junk)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could be loaded"));
}

#[test]
fn log_level_flag_overrides_config_level() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[logging]\nlevel = \"error\"\n").unwrap();
    let good = write_export(&dir, "Xe_5K_1", 30, 40, 2.0);
    let junk = dir.path().join("Xe_9K_1.txt");
    fs::write(&junk, "not an export\n").unwrap();

    // config level "error" suppresses the parse warning
    tpd()
        .arg("--config")
        .arg(&cfg)
        .arg("trim")
        .arg(&junk)
        .arg(&good)
        .assert()
        .success()
        .stderr(predicate::str::contains("cannot parse file").not());

    // an explicit flag wins over the config
    tpd()
        .arg("--config")
        .arg(&cfg)
        .args(["--log-level", "warn"])
        .arg("trim")
        .arg(&junk)
        .arg(&good)
        .assert()
        .success()
        .stderr(predicate::str::contains("cannot parse file"));
}

#[test]
fn invalid_config_is_rejected_before_any_work() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[trimming]\ntolerance = -1.0\n").unwrap();

    tpd()
        .arg("--config")
        .arg(&cfg)
        .arg("trim")
        .arg("whatever.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tolerance"));
}
