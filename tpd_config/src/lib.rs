#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the TPD analysis pipeline.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - These are schema types only; the runtime config structs live in
//!   `tpd_core::config` and are built from these via `From` impls.
use serde::Deserialize;

/// Linear-region detection options.
///
/// The detector scans the temperature channel for the first contiguous run of
/// samples whose local heating slope stays within `tolerance` of
/// `target_slope` for at least 20 seconds.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Trimming {
    /// Target heating-ramp slope in K/s.
    pub target_slope: f64,
    /// Allowed deviation from the target slope (K/s).
    pub tolerance: f64,
    /// Smooth the temperature channel before slope estimation.
    pub smoothing_enabled: bool,
    /// Moving-average window (samples) for temperature smoothing.
    pub smoothing_window: usize,
}

impl Default for Trimming {
    fn default() -> Self {
        Self {
            target_slope: 1.0,
            tolerance: 0.3,
            // raw first differences of a noisy ramp rarely stay within
            // tolerance, so smoothing is on unless explicitly disabled
            smoothing_enabled: true,
            smoothing_window: 10,
        }
    }
}

/// Integration options.
///
/// `left_window` / `right_window` are temperature sub-windows (Kelvin) for
/// ratio integration. Accepted as two-element arrays: `[110.0, 130.0]`.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Integration {
    /// Moving-average window (samples) applied to the temperature axis
    /// before Simpson integration.
    pub smoothing_window: usize,
    /// Left temperature sub-window for ratio integration.
    pub left_window: Option<(f64, f64)>,
    /// Right temperature sub-window for ratio integration.
    pub right_window: Option<(f64, f64)>,
}

impl Default for Integration {
    fn default() -> Self {
        Self {
            smoothing_window: 10,
            left_window: None,
            right_window: None,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub trimming: Trimming,
    pub integration: Integration,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Trimming
        if !self.trimming.target_slope.is_finite() {
            eyre::bail!("trimming.target_slope must be finite");
        }
        if !self.trimming.tolerance.is_finite() || self.trimming.tolerance < 0.0 {
            eyre::bail!("trimming.tolerance must be >= 0");
        }
        if self.trimming.smoothing_window == 0 {
            eyre::bail!("trimming.smoothing_window must be >= 1");
        }

        // Integration
        if self.integration.smoothing_window == 0 {
            eyre::bail!("integration.smoothing_window must be >= 1");
        }
        for (name, win) in [
            ("integration.left_window", self.integration.left_window),
            ("integration.right_window", self.integration.right_window),
        ] {
            if let Some((lo, hi)) = win {
                if !lo.is_finite() || !hi.is_finite() {
                    eyre::bail!("{name} bounds must be finite");
                }
                if lo > hi {
                    eyre::bail!("{name} start {lo} exceeds end {hi}");
                }
            }
        }
        if let (Some((_, left_hi)), Some((right_lo, _))) =
            (self.integration.left_window, self.integration.right_window)
            && left_hi > right_lo
        {
            eyre::bail!(
                "integration windows overlap: left ends at {left_hi}, right starts at {right_lo}"
            );
        }

        Ok(())
    }
}
