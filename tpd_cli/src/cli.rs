//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "tpd", version, about = "TPD analysis CLI")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results as JSON instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides
    /// `logging.level` from the config
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the linear heating region of each experiment
    Trim {
        /// Instrument export files (.txt)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Override trimming.target_slope (K/s)
        #[arg(long)]
        target_slope: Option<f64>,

        /// Override trimming.tolerance (K/s)
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Full-range Simpson integration keyed by dosage
    Integrate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Ratio integration between two temperature sub-windows
    Ratio {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Left temperature window, e.g. --left 110 130
        #[arg(long, num_args = 2, value_names = ["START", "END"])]
        left: Option<Vec<f64>>,

        /// Right temperature window, e.g. --right 150 170
        #[arg(long, num_args = 2, value_names = ["START", "END"])]
        right: Option<Vec<f64>>,
    },
    /// Fit calibration models to dosage-keyed integrals
    Calibrate {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Fit the zero-then-linear piecewise model to window ratios
        /// instead of a line to full integrals
        #[arg(long, action = ArgAction::SetTrue)]
        piecewise: bool,

        #[arg(long, num_args = 2, value_names = ["START", "END"])]
        left: Option<Vec<f64>>,

        #[arg(long, num_args = 2, value_names = ["START", "END"])]
        right: Option<Vec<f64>>,
    },
}
