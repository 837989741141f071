//! Simpson integration of ion-current channels over the temperature axis.
//!
//! Two operations, both over trimmed experiments: full-range integration
//! (dose-response) and ratio integration between two temperature
//! sub-windows (monolayer calibration). Results are keyed by the dosage
//! extracted from the experiment name; experiments without a usable dosage
//! or temperature reference are skipped with a warning.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::IntegrationCfg;
use crate::dosage::extract_dosage;
use crate::error::ConfigError;
use crate::experiment::TrimmedExperiment;
use crate::filter::moving_average;

/// Dosage used as a map key: total order over finite floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dosage(f64);

impl Dosage {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Eq for Dosage {}

impl Ord for Dosage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Dosage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Dosage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of a ratio integration. A right integral of exactly zero makes
/// the ratio undefined; that is a reportable value, not a fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(v),
            Self::Undefined => None,
        }
    }
}

/// Two disjoint temperature sub-windows for ratio integration.
#[derive(Debug, Clone, Copy)]
pub struct RatioWindows {
    pub left: (f64, f64),
    pub right: (f64, f64),
}

impl RatioWindows {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (start, end) in [self.left, self.right] {
            if start > end {
                return Err(ConfigError::InvalidWindowBounds { start, end });
            }
        }
        Ok(())
    }
}

/// Composite Simpson's rule tolerant of non-uniform sample spacing.
///
/// Every interval pair contributes via the three-point quadratic rule; a
/// leftover interval (even sample count) falls back to the trapezoid, as do
/// degenerate pairs with zero spacing. Fewer than two points integrate to 0.
pub fn simpson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len(), "integration arrays must align");
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }

    let trapezoid = |i: usize| (x[i + 1] - x[i]) * (y[i] + y[i + 1]) / 2.0;

    let mut total = 0.0;
    let mut i = 0;
    while i + 2 < n {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        if h0 == 0.0 || h1 == 0.0 {
            total += trapezoid(i) + trapezoid(i + 1);
        } else {
            // Uneven-spacing Simpson coefficients; reduce to h/3 (1,4,1)
            // when h0 == h1.
            let hsum = h0 + h1;
            total += hsum / 6.0
                * ((2.0 - h1 / h0) * y[i]
                    + (hsum * hsum / (h0 * h1)) * y[i + 1]
                    + (2.0 - h0 / h1) * y[i + 2]);
        }
        i += 2;
    }
    if i + 1 < n {
        total += trapezoid(i);
    }
    total
}

/// Full-range Simpson integration per experiment, summed over all
/// ion-current channels, keyed by dosage.
///
/// The integration axis is the smoothed temperature of the trimmed range.
/// On dosage collision the later experiment wins (kept for compatibility
/// with existing analyses, but warned).
pub fn full_integrals<'a, I>(
    experiments: I,
    cfg: &IntegrationCfg,
) -> Result<BTreeMap<Dosage, f64>, ConfigError>
where
    I: IntoIterator<Item = &'a TrimmedExperiment>,
{
    let mut out = BTreeMap::new();
    for trimmed in experiments {
        let Some((dosage, axis)) = prepare(trimmed, cfg)? else {
            continue;
        };
        let total: f64 = trimmed
            .experiment
            .ion_currents()
            .map(|channel| simpson(&axis, &channel.value))
            .sum();
        insert_by_dosage(&mut out, &trimmed.experiment.name, dosage, total);
    }
    Ok(out)
}

/// Ratio integration: left-window integral over right-window integral,
/// filtered by temperature membership, keyed by dosage.
pub fn ratio_integrals<'a, I>(
    experiments: I,
    windows: &RatioWindows,
    cfg: &IntegrationCfg,
) -> Result<BTreeMap<Dosage, Ratio>, ConfigError>
where
    I: IntoIterator<Item = &'a TrimmedExperiment>,
{
    windows.validate()?;
    let mut out = BTreeMap::new();
    for trimmed in experiments {
        let Some((dosage, axis)) = prepare(trimmed, cfg)? else {
            continue;
        };
        let mut left_total = 0.0;
        let mut right_total = 0.0;
        for channel in trimmed.experiment.ion_currents() {
            left_total += window_integral(&axis, &channel.value, windows.left);
            right_total += window_integral(&axis, &channel.value, windows.right);
        }
        let ratio = if right_total == 0.0 {
            tracing::warn!(
                experiment = %trimmed.experiment.name,
                "right window integrates to zero, ratio undefined"
            );
            Ratio::Undefined
        } else {
            Ratio::Defined(left_total / right_total)
        };
        insert_by_dosage(&mut out, &trimmed.experiment.name, dosage, ratio);
    }
    Ok(out)
}

/// Smoothed temperature axis plus dosage for one experiment, or `None` (with
/// a warning) when the experiment cannot take part in integration.
fn prepare(
    trimmed: &TrimmedExperiment,
    cfg: &IntegrationCfg,
) -> Result<Option<(f64, Vec<f64>)>, ConfigError> {
    let name = &trimmed.experiment.name;
    let Some(dosage) = extract_dosage(name) else {
        tracing::warn!(experiment = %name, "no dosage in experiment name, skipping");
        return Ok(None);
    };
    let Some(temperature) = trimmed.experiment.temperature() else {
        tracing::warn!(experiment = %name, "no temperature channel, skipping");
        return Ok(None);
    };
    let axis = moving_average(&temperature.value, cfg.smoothing_window)?;
    Ok(Some((dosage, axis)))
}

fn window_integral(axis: &[f64], current: &[f64], (start, end): (f64, f64)) -> f64 {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (&t, &c) in axis.iter().zip(current) {
        if t >= start && t <= end {
            x.push(t);
            y.push(c);
        }
    }
    simpson(&x, &y)
}

fn insert_by_dosage<V>(out: &mut BTreeMap<Dosage, V>, name: &str, dosage: f64, value: V) {
    if out.insert(Dosage::new(dosage), value).is_some() {
        tracing::warn!(
            experiment = %name,
            dosage,
            "duplicate dosage, keeping the later result"
        );
    }
}
