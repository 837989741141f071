#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! TPD analysis pipeline (GUI-agnostic).
//!
//! This crate turns raw Temperature-Programmed Desorption recordings into
//! dose-response and monolayer-calibration statistics. All visualization
//! concerns live outside; consumers exchange plain channel tables, trim
//! windows, and dosage-keyed maps with this crate.
//!
//! ## Pipeline
//!
//! - **Parsing**: tab-separated instrument exports into row-aligned channel
//!   tables (`parse` module)
//! - **Smoothing**: one shared moving-average routine (`filter` module)
//! - **Linear-region detection**: first qualifying heating-ramp run
//!   (`ramp` module)
//! - **Trimming**: consistent slicing of all channels to a time window
//!   (`trim` module)
//! - **Integration**: Simpson full-range and ratio integration keyed by
//!   dosage (`integrate`, `dosage` modules)
//! - **Calibration**: linear and zero-then-linear piecewise fits
//!   (`calibrate` module)
//! - **Store**: per-experiment trim state with replace-on-write semantics
//!   (`store` module)
//!
//! Hard failures (malformed files, invalid parameters) are typed errors;
//! expected conditions of real instrument data (no linear region, missing
//! dosage, zero right integral) are first-class result values.

pub mod calibrate;
pub mod config;
pub mod dosage;
pub mod error;
pub mod experiment;
pub mod filter;
pub mod integrate;
pub mod parse;
pub mod ramp;
pub mod store;
pub mod trim;

pub use calibrate::{LinearFit, PiecewiseFit, fit_linear, fit_piecewise};
pub use config::{IntegrationCfg, RampCfg};
pub use dosage::extract_dosage;
pub use error::{ConfigError, FitError, ParseError};
pub use experiment::{Channel, ChannelRole, Experiment, TrimRegion, TrimmedExperiment};
pub use filter::moving_average;
pub use integrate::{Dosage, Ratio, RatioWindows, full_integrals, ratio_integrals, simpson};
pub use parse::parse_experiment;
pub use ramp::{MIN_RAMP_SECONDS, detect_linear_region};
pub use store::{ExperimentEntry, ExperimentStore};
pub use trim::apply_trim;
