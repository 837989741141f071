use rstest::rstest;
use tpd_config::load_toml;

#[test]
fn defaults_parse_and_validate() {
    let cfg = load_toml("").expect("empty TOML uses defaults");
    cfg.validate().expect("defaults are valid");
    assert!((cfg.trimming.target_slope - 1.0).abs() < f64::EPSILON);
    assert!((cfg.trimming.tolerance - 0.3).abs() < f64::EPSILON);
    assert!(cfg.trimming.smoothing_enabled);
    assert_eq!(cfg.trimming.smoothing_window, 10);
    assert_eq!(cfg.integration.smoothing_window, 10);
}

#[test]
fn rejects_zero_smoothing_window() {
    let toml = r#"
[trimming]
target_slope = 1.0
tolerance = 0.3
smoothing_enabled = true
smoothing_window = 0
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject smoothing_window=0");
    assert!(
        format!("{err}")
            .to_lowercase()
            .contains("smoothing_window must be >= 1")
    );
}

#[rstest]
#[case("-0.1")]
#[case("nan")]
fn rejects_bad_tolerance(#[case] tolerance: &str) {
    let toml = format!(
        r#"
[trimming]
tolerance = {tolerance}
"#
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject tolerance");
    assert!(format!("{err}").contains("tolerance must be >= 0"));
}

#[test]
fn rejects_inverted_ratio_window() {
    let toml = r#"
[integration]
left_window = [130.0, 110.0]
right_window = [150.0, 170.0]
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject inverted window");
    assert!(format!("{err}").contains("left_window start"));
}

#[test]
fn rejects_overlapping_ratio_windows() {
    let toml = r#"
[integration]
left_window = [110.0, 155.0]
right_window = [150.0, 170.0]
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject overlap");
    assert!(format!("{err}").contains("windows overlap"));
}

#[test]
fn accepts_disjoint_ratio_windows() {
    let toml = r#"
[trimming]
target_slope = 2.0
tolerance = 0.5
smoothing_enabled = true
smoothing_window = 5

[integration]
smoothing_window = 8
left_window = [110.0, 130.0]
right_window = [150.0, 170.0]

[logging]
level = "debug"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.integration.left_window, Some((110.0, 130.0)));
    assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
}
