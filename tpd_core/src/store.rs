//! In-memory experiment store shared by the pipeline's consumers.
//!
//! One coherent view of per-experiment trim state: each entry pairs the
//! parsed channels with the current trim region and its derived trimmed
//! copy. Entries are replaced wholesale on every update so old and new
//! derived state are never partially visible. Insertion order is preserved;
//! there are no ambient singletons.

use crate::config::RampCfg;
use crate::error::ConfigError;
use crate::experiment::{Experiment, TrimRegion, TrimmedExperiment};
use crate::ramp::detect_linear_region;
use crate::trim::apply_trim;

#[derive(Debug, Clone)]
pub struct ExperimentEntry {
    pub experiment: Experiment,
    /// `None` means "no qualifying linear region found".
    pub trim_region: Option<TrimRegion>,
    pub trimmed: Option<TrimmedExperiment>,
}

#[derive(Debug, Default, Clone)]
pub struct ExperimentStore {
    entries: Vec<ExperimentEntry>,
}

impl ExperimentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parsed experiment. Re-inserting a name replaces the previous
    /// entry and discards its derived trim state.
    pub fn insert(&mut self, experiment: Experiment) {
        let entry = ExperimentEntry {
            experiment,
            trim_region: None,
            trimmed: None,
        };
        match self.position(&entry.experiment.name) {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Runs linear-region detection on every experiment and retrims.
    ///
    /// Experiments without a qualifying region keep `None` and lose any
    /// previously derived trimmed copy; downstream consumers treat them as
    /// "cannot produce trimmed output", not as failures.
    pub fn auto_trim_all(&mut self, cfg: &RampCfg) -> Result<(), ConfigError> {
        for i in 0..self.entries.len() {
            let region = match self.entries[i].experiment.reference() {
                Some(reference) => {
                    detect_linear_region(&reference.time, &reference.value, cfg)?
                }
                None => None,
            };
            let experiment = self.entries[i].experiment.clone();
            let (trim_region, trimmed) = match region {
                Some(r) => (Some(r), Some(apply_trim(&experiment, r))),
                None => {
                    tracing::warn!(experiment = %experiment.name, "no linear region found");
                    (None, None)
                }
            };
            // Entry replaced wholesale: region and trimmed copy never
            // partially visible.
            self.entries[i] = ExperimentEntry {
                experiment,
                trim_region,
                trimmed,
            };
        }
        Ok(())
    }

    /// Overrides the trim window with externally supplied boundaries (e.g.
    /// from an interactive collaborator) and recomputes the trimmed copy.
    /// Returns `false` when the experiment is unknown.
    pub fn set_trim_region(&mut self, name: &str, start: f64, end: f64) -> bool {
        let Some(i) = self.position(name) else {
            return false;
        };
        let region = TrimRegion::new(start, end);
        let experiment = self.entries[i].experiment.clone();
        let trimmed = apply_trim(&experiment, region);
        self.entries[i] = ExperimentEntry {
            experiment,
            trim_region: Some(region),
            trimmed: Some(trimmed),
        };
        true
    }

    pub fn get(&self, name: &str) -> Option<&ExperimentEntry> {
        self.position(name).map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> impl Iterator<Item = &ExperimentEntry> {
        self.entries.iter()
    }

    /// Trimmed experiments only, in insertion order; the integration engine
    /// consumes these.
    pub fn trimmed_experiments(&self) -> impl Iterator<Item = &TrimmedExperiment> {
        self.entries.iter().filter_map(|e| e.trimmed.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.experiment.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{Channel, ChannelRole};

    fn ramp_experiment(name: &str, ramp_s: usize) -> Experiment {
        let n = ramp_s + 40;
        let time: Vec<f64> = (0..=n).map(|i| i as f64).collect();
        let temp: Vec<f64> = (0..=n)
            .map(|i| 100.0 + (i.min(ramp_s)) as f64)
            .collect();
        let mut e = Experiment::new(name);
        e.push_channel(Channel::new(
            format!("{name}_m18"),
            ChannelRole::IonCurrent,
            time.clone(),
            vec![1.0; n + 1],
        ));
        e.push_channel(Channel::new(
            format!("{name}_temp"),
            ChannelRole::Temperature,
            time,
            temp,
        ));
        e
    }

    #[test]
    fn auto_trim_sets_region_and_trimmed_copy() {
        let mut store = ExperimentStore::new();
        store.insert(ramp_experiment("Xe_5K_1", 30));
        store.auto_trim_all(&RampCfg::default()).unwrap();
        let entry = store.get("Xe_5K_1").unwrap();
        let region = entry.trim_region.expect("region found");
        assert!(region.span() >= 20.0);
        assert!(entry.trimmed.is_some());
        assert_eq!(store.trimmed_experiments().count(), 1);
    }

    #[test]
    fn failed_detection_clears_previous_trim() {
        let mut store = ExperimentStore::new();
        store.insert(ramp_experiment("Xe_5K_1", 30));
        store.auto_trim_all(&RampCfg::default()).unwrap();
        assert!(store.get("Xe_5K_1").unwrap().trimmed.is_some());

        // impossible slope target: no region, derived state dropped
        let strict = RampCfg {
            target_slope: 50.0,
            tolerance: 0.1,
            ..RampCfg::default()
        };
        store.auto_trim_all(&strict).unwrap();
        let entry = store.get("Xe_5K_1").unwrap();
        assert_eq!(entry.trim_region, None);
        assert!(entry.trimmed.is_none());
    }

    #[test]
    fn manual_boundaries_override_detection() {
        let mut store = ExperimentStore::new();
        store.insert(ramp_experiment("Xe_5K_1", 30));
        assert!(store.set_trim_region("Xe_5K_1", 25.0, 5.0)); // reversed on purpose
        let entry = store.get("Xe_5K_1").unwrap();
        let region = entry.trim_region.unwrap();
        assert_eq!((region.start, region.end), (5.0, 25.0));
        assert_eq!(entry.trimmed.as_ref().unwrap().experiment.row_count(), 21);
        assert!(!store.set_trim_region("unknown", 0.0, 1.0));
    }

    #[test]
    fn reinsert_replaces_entry_and_resets_state() {
        let mut store = ExperimentStore::new();
        store.insert(ramp_experiment("Xe_5K_1", 30));
        store.auto_trim_all(&RampCfg::default()).unwrap();
        store.insert(ramp_experiment("Xe_5K_1", 25));
        let entry = store.get("Xe_5K_1").unwrap();
        assert_eq!(entry.trim_region, None);
        assert_eq!(store.len(), 1);
    }
}
