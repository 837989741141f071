//! Moving-average (box) smoothing shared by trimming and integration.
//!
//! Both call sites must smooth identically, so this is the single smoothing
//! routine in the crate.

use crate::error::ConfigError;

/// Centered uniform (box) filter. Output length equals input length; each
/// sample is the mean of the window centered on it, truncated at the edges.
/// Even windows take the extra sample on the left.
///
/// `window < 1` is rejected before any computation.
pub fn moving_average(values: &[f64], window: usize) -> Result<Vec<f64>, ConfigError> {
    if window < 1 {
        return Err(ConfigError::InvalidSmoothingWindow(window));
    }
    if window == 1 || values.len() <= 1 {
        return Ok(values.to_vec());
    }

    let n = values.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let lo = i.saturating_sub(window / 2);
        let hi = (i + (window - 1) / 2).min(n - 1);
        let count = (hi - lo + 1) as f64;
        let sum: f64 = values[lo..=hi].iter().sum();
        out.push(sum / count);
    }
    Ok(out)
}
