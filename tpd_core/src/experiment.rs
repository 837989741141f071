//! Typed channel tables for one TPD experiment.
//!
//! An `Experiment` owns its channels in parse order; the temperature channel
//! is tagged explicitly at parse time rather than inferred positionally by
//! downstream code. All channels of one experiment are row-aligned.

/// Role of a channel within an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    /// Detector current for one species.
    IonCurrent,
    /// Heating-ramp temperature reference.
    Temperature,
}

/// A named ordered sequence of (time, value) samples.
///
/// Units: seconds for time, Kelvin for temperature values, arbitrary current
/// units for ion channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub role: ChannelRole,
    pub time: Vec<f64>,
    pub value: Vec<f64>,
}

impl Channel {
    pub fn new(name: String, role: ChannelRole, time: Vec<f64>, value: Vec<f64>) -> Self {
        debug_assert_eq!(time.len(), value.len(), "channel rows must align");
        Self {
            name,
            role,
            time,
            value,
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// One parsed experiment: a named set of row-aligned channels in parse order.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub name: String,
    channels: Vec<Channel>,
}

impl Experiment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
        }
    }

    pub fn push_channel(&mut self, channel: Channel) {
        debug_assert!(
            self.channels
                .iter()
                .all(|c| c.len() == channel.len()),
            "all channels of one experiment share a row index"
        );
        self.channels.push(channel);
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// The temperature reference channel, if one was tagged at parse time.
    pub fn temperature(&self) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|c| c.role == ChannelRole::Temperature)
    }

    pub fn ion_currents(&self) -> impl Iterator<Item = &Channel> {
        self.channels
            .iter()
            .filter(|c| c.role == ChannelRole::IonCurrent)
    }

    /// Reference channel for resolving a time window against row indices:
    /// the temperature channel, else the first channel.
    pub fn reference(&self) -> Option<&Channel> {
        self.temperature().or_else(|| self.channels.first())
    }

    /// Shared row count of all channels (0 when no channels present).
    pub fn row_count(&self) -> usize {
        self.channels.first().map_or(0, Channel::len)
    }
}

/// A time window bounding the linear heating region.
///
/// Expressed in time values rather than row indices so it stays portable
/// across channels with different sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRegion {
    pub start: f64,
    pub end: f64,
}

impl TrimRegion {
    /// Builds a region with ordered bounds; reversed inputs are swapped so
    /// `end >= start` always holds (externally supplied boundaries may come
    /// in either order).
    pub fn new(a: f64, b: f64) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Channels of one experiment restricted to a trim window.
///
/// Recomputed whenever the region changes; replaced wholesale, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedExperiment {
    pub region: TrimRegion,
    pub experiment: Experiment,
}

impl TrimmedExperiment {
    pub fn is_empty(&self) -> bool {
        self.experiment.row_count() == 0
    }
}
