//! Consistent trimming of every channel of an experiment to a time window.

use crate::experiment::{Channel, Experiment, TrimRegion, TrimmedExperiment};

/// Restricts every channel of `experiment` to the rows whose
/// reference-channel time lies within the region (inclusive).
///
/// The window is resolved against the temperature channel (else the first
/// channel) and the resulting row selection applied identically everywhere,
/// preserving row alignment. An empty selection yields an empty
/// `TrimmedExperiment`; the caller treats that as "no data", not an error.
/// Idempotent: re-applying the same region to the same experiment produces
/// identical output.
pub fn apply_trim(experiment: &Experiment, region: TrimRegion) -> TrimmedExperiment {
    let rows: Vec<usize> = experiment.reference().map_or_else(Vec::new, |reference| {
        reference
            .time
            .iter()
            .enumerate()
            .filter(|&(_, &t)| region.contains(t))
            .map(|(i, _)| i)
            .collect()
    });

    let mut trimmed = Experiment::new(experiment.name.clone());
    for channel in experiment.channels() {
        trimmed.push_channel(Channel::new(
            channel.name.clone(),
            channel.role,
            rows.iter().map(|&i| channel.time[i]).collect(),
            rows.iter().map(|&i| channel.value[i]).collect(),
        ));
    }
    TrimmedExperiment {
        region,
        experiment: trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::ChannelRole;

    fn experiment() -> Experiment {
        let time: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut e = Experiment::new("run");
        e.push_channel(Channel::new(
            "run_m18".into(),
            ChannelRole::IonCurrent,
            time.clone(),
            (0..10).map(|i| i as f64 * 2.0).collect(),
        ));
        e.push_channel(Channel::new(
            "run_temp".into(),
            ChannelRole::Temperature,
            time,
            (0..10).map(|i| 100.0 + i as f64).collect(),
        ));
        e
    }

    #[test]
    fn trims_all_channels_to_the_same_rows() {
        let e = experiment();
        let out = apply_trim(&e, TrimRegion::new(2.0, 5.0));
        assert_eq!(out.experiment.row_count(), 4);
        for channel in out.experiment.channels() {
            assert_eq!(channel.time, vec![2.0, 3.0, 4.0, 5.0]);
        }
        assert_eq!(
            out.experiment.channel("run_m18").unwrap().value,
            vec![4.0, 6.0, 8.0, 10.0]
        );
    }

    #[test]
    fn window_outside_data_yields_empty_result() {
        let e = experiment();
        let out = apply_trim(&e, TrimRegion::new(100.0, 200.0));
        assert!(out.is_empty());
        assert_eq!(out.experiment.channels().len(), 2);
    }
}
