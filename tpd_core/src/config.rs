//! Runtime configuration for the analysis pipeline.
//!
//! These are the structs the pipeline consumes. They are separate from the
//! TOML-deserialized schema in `tpd_config`; `From` impls bridge the two.

/// Linear-region detection parameters.
#[derive(Debug, Clone, Copy)]
pub struct RampCfg {
    /// Target heating-ramp slope (K/s).
    pub target_slope: f64,
    /// Allowed deviation from the target slope (K/s).
    pub tolerance: f64,
    /// Smooth the temperature channel before slope estimation.
    pub smoothing_enabled: bool,
    /// Moving-average window (samples) when smoothing is enabled.
    pub smoothing_window: usize,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            target_slope: 1.0,
            tolerance: 0.3,
            smoothing_enabled: true,
            smoothing_window: 10,
        }
    }
}

/// Integration parameters.
#[derive(Debug, Clone, Copy)]
pub struct IntegrationCfg {
    /// Moving-average window (samples) applied to the temperature axis
    /// before Simpson integration.
    pub smoothing_window: usize,
}

impl Default for IntegrationCfg {
    fn default() -> Self {
        Self {
            smoothing_window: 10,
        }
    }
}

impl From<&tpd_config::Trimming> for RampCfg {
    fn from(c: &tpd_config::Trimming) -> Self {
        Self {
            target_slope: c.target_slope,
            tolerance: c.tolerance,
            smoothing_enabled: c.smoothing_enabled,
            smoothing_window: c.smoothing_window,
        }
    }
}

impl From<&tpd_config::Integration> for IntegrationCfg {
    fn from(c: &tpd_config::Integration) -> Self {
        Self {
            smoothing_window: c.smoothing_window,
        }
    }
}
