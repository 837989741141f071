//! Batch pipeline behind the subcommands: load export files, trim,
//! integrate, fit, report.
//!
//! Per-file failures are warned about and skipped so one bad export does
//! not sink a batch; a command only errors when nothing at all succeeded.

use std::fs;
use std::path::PathBuf;

use eyre::Result;
use tpd_config::Config;
use tpd_core::calibrate::{fit_linear, fit_piecewise};
use tpd_core::config::{IntegrationCfg, RampCfg};
use tpd_core::integrate::{Ratio, RatioWindows, full_integrals, ratio_integrals};
use tpd_core::parse::parse_experiment;
use tpd_core::store::ExperimentStore;

/// Parses every input file into the store, keyed by file stem. Unreadable
/// or malformed files are skipped with a warning; an empty store afterwards
/// is an error.
pub fn load_store(files: &[PathBuf]) -> Result<ExperimentStore> {
    let mut store = ExperimentStore::new();
    for path in files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!(file = %path.display(), "file name is not valid UTF-8, skipping");
            continue;
        };
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "cannot read file, skipping");
                continue;
            }
        };
        match parse_experiment(stem, &content) {
            Ok(experiment) => store.insert(experiment),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "cannot parse file, skipping");
            }
        }
    }
    if store.is_empty() {
        eyre::bail!("none of the {} input file(s) could be loaded", files.len());
    }
    Ok(store)
}

/// Loads and auto-trims in one go; every downstream command starts here.
fn load_trimmed(files: &[PathBuf], ramp: &RampCfg) -> Result<ExperimentStore> {
    let mut store = load_store(files)?;
    store.auto_trim_all(ramp)?;
    Ok(store)
}

pub fn run_trim(
    files: &[PathBuf],
    cfg: &Config,
    target_slope: Option<f64>,
    tolerance: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut ramp = RampCfg::from(&cfg.trimming);
    if let Some(slope) = target_slope {
        ramp.target_slope = slope;
    }
    if let Some(tolerance) = tolerance {
        ramp.tolerance = tolerance;
    }
    let store = load_trimmed(files, &ramp)?;

    if json {
        let experiments: Vec<_> = store
            .entries()
            .map(|entry| {
                serde_json::json!({
                    "experiment": entry.experiment.name,
                    "trim_start": entry.trim_region.map(|r| r.start),
                    "trim_end": entry.trim_region.map(|r| r.end),
                    "rows": entry.trimmed.as_ref().map(|t| t.experiment.row_count()),
                })
            })
            .collect();
        print_json(&serde_json::json!({ "experiments": experiments }))?;
    } else {
        for entry in store.entries() {
            match entry.trim_region {
                Some(region) => println!(
                    "{}: linear region {:.3} s .. {:.3} s ({} rows)",
                    entry.experiment.name,
                    region.start,
                    region.end,
                    entry.trimmed.as_ref().map_or(0, |t| t.experiment.row_count()),
                ),
                None => println!("{}: no linear region found", entry.experiment.name),
            }
        }
    }
    Ok(())
}

pub fn run_integrate(files: &[PathBuf], cfg: &Config, json: bool) -> Result<()> {
    let store = load_trimmed(files, &RampCfg::from(&cfg.trimming))?;
    let integration = IntegrationCfg::from(&cfg.integration);
    let integrals = full_integrals(store.trimmed_experiments(), &integration)?;
    if integrals.is_empty() {
        eyre::bail!("no experiment produced an integral (no linear region or no dosage)");
    }

    if json {
        let rows: Vec<_> = integrals
            .iter()
            .map(|(dosage, integral)| {
                serde_json::json!({ "dosage": dosage.value(), "integral": integral })
            })
            .collect();
        print_json(&serde_json::json!({ "integrals": rows }))?;
    } else {
        for (dosage, integral) in &integrals {
            println!("dosage {dosage}: integral {integral:.6e}");
        }
    }
    Ok(())
}

pub fn run_ratio(
    files: &[PathBuf],
    cfg: &Config,
    left: Option<&[f64]>,
    right: Option<&[f64]>,
    json: bool,
) -> Result<()> {
    let windows = resolve_windows(left, right, cfg)?;
    let store = load_trimmed(files, &RampCfg::from(&cfg.trimming))?;
    let integration = IntegrationCfg::from(&cfg.integration);
    let ratios = ratio_integrals(store.trimmed_experiments(), &windows, &integration)?;
    if ratios.is_empty() {
        eyre::bail!("no experiment produced a ratio (no linear region or no dosage)");
    }

    if json {
        let rows: Vec<_> = ratios
            .iter()
            .map(|(dosage, ratio)| {
                serde_json::json!({ "dosage": dosage.value(), "ratio": ratio.as_f64() })
            })
            .collect();
        print_json(&serde_json::json!({ "ratios": rows }))?;
    } else {
        for (dosage, ratio) in &ratios {
            match ratio {
                Ratio::Defined(r) => println!("dosage {dosage}: ratio {r:.6}"),
                Ratio::Undefined => {
                    println!("dosage {dosage}: undefined (right window integrates to zero)");
                }
            }
        }
    }
    Ok(())
}

pub fn run_calibrate(
    files: &[PathBuf],
    cfg: &Config,
    piecewise: bool,
    left: Option<&[f64]>,
    right: Option<&[f64]>,
    json: bool,
) -> Result<()> {
    let store = load_trimmed(files, &RampCfg::from(&cfg.trimming))?;
    let integration = IntegrationCfg::from(&cfg.integration);

    if piecewise {
        let windows = resolve_windows(left, right, cfg)?;
        let ratios = ratio_integrals(store.trimmed_experiments(), &windows, &integration)?;
        let mut dosages = Vec::new();
        let mut values = Vec::new();
        for (dosage, ratio) in &ratios {
            match ratio.as_f64() {
                Some(r) => {
                    dosages.push(dosage.value());
                    values.push(r);
                }
                None => {
                    tracing::warn!(dosage = %dosage, "undefined ratio excluded from fit");
                }
            }
        }
        let fit = fit_piecewise(&dosages, &values)?;
        if json {
            print_json(&serde_json::json!({
                "model": "piecewise",
                "threshold": fit.threshold,
                "slope": fit.slope,
                "points": point_rows(&fit.dosages, &fit.values),
            }))?;
        } else {
            println!(
                "piecewise fit over {} point(s): threshold {:.6}, slope {:.6}",
                fit.dosages.len(),
                fit.threshold,
                fit.slope,
            );
        }
    } else {
        let integrals = full_integrals(store.trimmed_experiments(), &integration)?;
        let dosages: Vec<f64> = integrals.keys().map(|d| d.value()).collect();
        let values: Vec<f64> = integrals.values().copied().collect();
        let fit = fit_linear(&dosages, &values)?;
        if json {
            print_json(&serde_json::json!({
                "model": "linear",
                "slope": fit.slope,
                "intercept": fit.intercept,
                "points": point_rows(&fit.dosages, &fit.values),
            }))?;
        } else {
            println!(
                "linear fit over {} point(s): slope {:.6e}, intercept {:.6e}",
                fit.dosages.len(),
                fit.slope,
                fit.intercept,
            );
        }
    }
    Ok(())
}

/// Ratio windows from flags first, then config; both sides are required.
fn resolve_windows(
    left: Option<&[f64]>,
    right: Option<&[f64]>,
    cfg: &Config,
) -> Result<RatioWindows> {
    let pick = |flag: Option<&[f64]>, from_cfg: Option<(f64, f64)>, name: &str| {
        if let Some(bounds) = flag {
            // clap enforces num_args = 2
            Ok((bounds[0], bounds[1]))
        } else if let Some(window) = from_cfg {
            Ok(window)
        } else {
            Err(eyre::eyre!(
                "no {name} window given (pass --{name} START END or set integration.{name}_window)"
            ))
        }
    };
    let windows = RatioWindows {
        left: pick(left, cfg.integration.left_window, "left")?,
        right: pick(right, cfg.integration.right_window, "right")?,
    };
    windows.validate()?;
    Ok(windows)
}

fn point_rows(dosages: &[f64], values: &[f64]) -> Vec<serde_json::Value> {
    dosages
        .iter()
        .zip(values)
        .map(|(d, v)| serde_json::json!({ "dosage": d, "value": v }))
        .collect()
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
