//! Calibration fitting over (dosage, integral) pairs.
//!
//! Two models back the monolayer calibration plots: an ordinary
//! least-squares line, and a zero-then-linear piecewise model
//! `f(x) = slope * max(x - threshold, 0)` whose threshold estimates the
//! coverage onset. Fits are performed in f64 and either converge
//! deterministically or report failure; there is no silent fallback.

use crate::error::FitError;

/// Least-squares line `y = slope * x + intercept` plus the samples it was
/// fitted on (kept for external plotting).
#[derive(Debug, Clone)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub dosages: Vec<f64>,
    pub values: Vec<f64>,
}

/// Piecewise model: 0 below `threshold`, `slope * (x - threshold)` at and
/// above it.
#[derive(Debug, Clone)]
pub struct PiecewiseFit {
    pub threshold: f64,
    pub slope: f64,
    pub dosages: Vec<f64>,
    pub values: Vec<f64>,
}

impl PiecewiseFit {
    pub fn evaluate(&self, x: f64) -> f64 {
        piecewise_linear(x, self.threshold, self.slope)
    }
}

pub fn piecewise_linear(x: f64, threshold: f64, slope: f64) -> f64 {
    if x < threshold {
        0.0
    } else {
        slope * (x - threshold)
    }
}

/// Ordinary least squares over (dosage, value) pairs.
pub fn fit_linear(dosages: &[f64], values: &[f64]) -> Result<LinearFit, FitError> {
    let n = dosages.len().min(values.len());
    if n < 2 {
        return Err(FitError::TooFewPoints { needed: 2, got: n });
    }
    let (slope, intercept) = ols(&zip(dosages, values, n))?;
    Ok(LinearFit {
        slope,
        intercept,
        dosages: dosages[..n].to_vec(),
        values: values[..n].to_vec(),
    })
}

/// Fits the piecewise model by profiled least squares.
///
/// For a fixed threshold the optimal slope has a closed form, so the search
/// reduces to a one-dimensional scan over the threshold: a grid over the
/// dosage range refined around the running best, seeded with the
/// conventional initial guess `threshold = median(dosages)`. The procedure
/// is fully deterministic for any input ordering of the same samples.
pub fn fit_piecewise(dosages: &[f64], values: &[f64]) -> Result<PiecewiseFit, FitError> {
    const GRID: usize = 100;
    const ROUNDS: usize = 4;

    let n = dosages.len().min(values.len());
    if n < 3 {
        return Err(FitError::TooFewPoints { needed: 3, got: n });
    }
    let pts = zip(dosages, values, n);
    let x_min = pts.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = pts.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if !(x_min.is_finite() && x_max.is_finite()) {
        return Err(FitError::DegenerateInput("non-finite dosage"));
    }
    if x_max <= x_min {
        return Err(FitError::DegenerateInput("zero dosage range"));
    }

    // Seed with the conventional initial guess.
    let mut best_t = median(dosages, n);
    let mut best = profile(&pts, best_t);

    let mut lo = x_min;
    let mut hi = x_max;
    for _ in 0..ROUNDS {
        let step = (hi - lo) / GRID as f64;
        for k in 0..=GRID {
            let t = lo + step * k as f64;
            if let Some((slope, ss)) = profile(&pts, t)
                && best.is_none_or(|(_, best_ss)| ss < best_ss)
            {
                best = Some((slope, ss));
                best_t = t;
            }
        }
        // Narrow around the running best for the next refinement round.
        lo = (best_t - step).max(x_min);
        hi = (best_t + step).min(x_max);
    }

    match best {
        Some((slope, ss)) if slope.is_finite() && ss.is_finite() => Ok(PiecewiseFit {
            threshold: best_t,
            slope,
            dosages: dosages[..n].to_vec(),
            values: values[..n].to_vec(),
        }),
        _ => Err(FitError::DidNotConverge),
    }
}

/// Closed-form slope and residual sum of squares for a fixed threshold.
/// `None` when no sample lies above the threshold (slope unidentifiable).
fn profile(pts: &[(f64, f64)], threshold: f64) -> Option<(f64, f64)> {
    let mut num = 0.0;
    let mut den = 0.0;
    for &(x, y) in pts {
        let u = (x - threshold).max(0.0);
        num += y * u;
        den += u * u;
    }
    if den == 0.0 {
        return None;
    }
    let slope = num / den;
    let ss: f64 = pts
        .iter()
        .map(|&(x, y)| {
            let r = y - piecewise_linear(x, threshold, slope);
            r * r
        })
        .sum();
    Some((slope, ss))
}

fn ols(pts: &[(f64, f64)]) -> Result<(f64, f64), FitError> {
    let n = pts.len() as f64;
    let mean_x = pts.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pts.iter().map(|p| p.1).sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for &(x, y) in pts {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if !sxx.is_finite() || sxx == 0.0 {
        return Err(FitError::DegenerateInput("degenerate dosage variance"));
    }
    let slope = sxy / sxx;
    if !slope.is_finite() {
        return Err(FitError::DegenerateInput("non-finite slope"));
    }
    Ok((slope, mean_y - slope * mean_x))
}

fn zip(x: &[f64], y: &[f64], n: usize) -> Vec<(f64, f64)> {
    x[..n].iter().copied().zip(y[..n].iter().copied()).collect()
}

fn median(values: &[f64], n: usize) -> f64 {
    let mut sorted = values[..n].to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = n / 2;
    if n % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
