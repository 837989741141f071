//! Linear heating-region detection.
//!
//! The physically meaningful part of a TPD recording is the stretch where
//! temperature rises at a near-constant rate. The detector estimates the
//! local slope of (optionally smoothed) temperature over time, flags samples
//! within tolerance of the target slope, and takes the first contiguous run
//! long enough to matter.

use crate::config::RampCfg;
use crate::error::ConfigError;
use crate::experiment::TrimRegion;
use crate::filter::moving_average;

/// Minimum duration (seconds) a qualifying run must span.
pub const MIN_RAMP_SECONDS: f64 = 20.0;

/// Finds the trim window for a temperature channel.
///
/// Returns `Ok(None)` when no qualifying run exists; that is an expected
/// outcome of real instrument data, not an error. The *first* run meeting
/// the duration threshold wins, never the longest or the best-fitting one;
/// that policy is a reproducibility contract with older analyses.
///
/// Sample `i` qualifies when the first-difference slope
/// `(temp[i] - temp[i-1]) / (time[i] - time[i-1])` is within `tolerance` of
/// `target_slope`; sample 0 never qualifies, and neither does a sample whose
/// time step is zero or negative (non-monotonic time must not fault).
pub fn detect_linear_region(
    time: &[f64],
    temperature: &[f64],
    cfg: &RampCfg,
) -> Result<Option<TrimRegion>, ConfigError> {
    if !cfg.tolerance.is_finite() || cfg.tolerance < 0.0 {
        return Err(ConfigError::InvalidTolerance(cfg.tolerance));
    }
    let smoothed;
    let temp: &[f64] = if cfg.smoothing_enabled {
        smoothed = moving_average(temperature, cfg.smoothing_window)?;
        &smoothed
    } else {
        temperature
    };

    if time.len() != temp.len() || time.len() < 2 {
        return Ok(None);
    }

    let qualifies = |i: usize| -> bool {
        if i == 0 {
            return false;
        }
        let dt = time[i] - time[i - 1];
        if dt <= 0.0 {
            return false;
        }
        let slope = (temp[i] - temp[i - 1]) / dt;
        slope.is_finite() && (slope - cfg.target_slope).abs() <= cfg.tolerance
    };

    let mut run_start: Option<usize> = None;
    for i in 0..time.len() {
        if qualifies(i) {
            run_start.get_or_insert(i);
        } else if let Some(start) = run_start.take()
            && time[i - 1] - time[start] >= MIN_RAMP_SECONDS
        {
            return Ok(Some(TrimRegion::new(time[start], time[i - 1])));
        }
    }
    // A run reaching the end of the series still counts.
    if let Some(start) = run_start {
        let last = time.len() - 1;
        if time[last] - time[start] >= MIN_RAMP_SECONDS {
            return Ok(Some(TrimRegion::new(time[start], time[last])));
        }
    }
    Ok(None)
}
