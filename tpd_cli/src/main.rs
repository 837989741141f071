#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! `tpd` batch front end: trims, integrates and calibrates instrument
//! exports from the command line.

mod cli;
mod pipeline;

use std::path::Path;

use clap::Parser;
use eyre::WrapErr;
use tpd_config::Config;

use crate::cli::{Cli, Commands, FILE_GUARD};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    let cfg = load_config(args.config.as_deref())?;
    cfg.validate().wrap_err("invalid config")?;
    init_tracing(&args, &cfg);

    match &args.cmd {
        Commands::Trim {
            files,
            target_slope,
            tolerance,
        } => pipeline::run_trim(files, &cfg, *target_slope, *tolerance, args.json),
        Commands::Integrate { files } => pipeline::run_integrate(files, &cfg, args.json),
        Commands::Ratio { files, left, right } => {
            pipeline::run_ratio(files, &cfg, left.as_deref(), right.as_deref(), args.json)
        }
        Commands::Calibrate {
            files,
            piecewise,
            left,
            right,
        } => pipeline::run_calibrate(
            files,
            &cfg,
            *piecewise,
            left.as_deref(),
            right.as_deref(),
            args.json,
        ),
    }
}

fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .wrap_err_with(|| format!("cannot read config {}", p.display()))?;
            tpd_config::load_toml(&text)
                .wrap_err_with(|| format!("cannot parse config {}", p.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Console logs go to stderr so stdout stays clean for results. When
/// `logging.file` is set, logs are written there as JSON lines instead.
/// `RUST_LOG` overrides everything; otherwise `--log-level` beats
/// `logging.level` from the config, and the fallback is `info`.
fn init_tracing(args: &Cli, cfg: &Config) {
    use tracing_subscriber::EnvFilter;

    let level = args
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "info".into());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match cfg.logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map_or_else(|| "tpd.log".into(), std::ffi::OsStr::to_os_string);
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            // keep the worker alive for the process lifetime
            let _ = FILE_GUARD.set(guard);
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(writer)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
