//! Metrics for the status relay base station.
//!
//! Every metric the station records is declared here as a [`Metric`] constant,
//! so names, units and label keys live in one place. The `metrics` crate is
//! re-exported; without an installed recorder all recording is a no-op.
//!
//! # Example
//!
//! ```rust
//! use relay_metrics::{metric_defs, metrics, StationLabels};
//!
//! let labels = StationLabels::new("base", "compact");
//! metrics::counter!(metric_defs::FRAMES_RECEIVED.name, &labels.to_labels()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonically increasing counter.
    Counter,
    /// Value that can go up and down.
    Gauge,
    /// Distribution of recorded values.
    Histogram,
}

impl MetricKind {
    /// Lowercase name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use relay_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const DROPPED: Metric = Metric::counter("relay.example.dropped")
///     .with_description("Frames dropped")
///     .with_unit(Unit::Count)
///     .with_labels(&["station"]);
///
/// assert_eq!(DROPPED.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// Metric name, e.g. `relay.station.frames_received`.
    pub name: &'static str,
    /// Counter, gauge or histogram.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// Unit of measurement, if any.
    pub unit: Option<Unit>,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// A counter named `name`.
    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, MetricKind::Counter)
    }

    /// A gauge named `name`.
    pub const fn gauge(name: &'static str) -> Self {
        Self::new(name, MetricKind::Gauge)
    }

    /// A histogram named `name`.
    pub const fn histogram(name: &'static str) -> Self {
        Self::new(name, MetricKind::Histogram)
    }

    /// Set the description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Set the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Set the expected label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Register this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// Metric definitions for the base station.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Labels present on every station metric.
    pub const STATION_LABELS: &[&str] = &["station", "format"];

    /// Frames handed to the station by the radio.
    pub const FRAMES_RECEIVED: Metric = Metric::counter("relay.station.frames_received")
        .with_description("Frames handed to the station by the radio")
        .with_unit(Unit::Count)
        .with_labels(STATION_LABELS);

    /// Frames dropped for wrong size or failed decode.
    ///
    /// Labels: station, format, reason
    pub const FRAMES_REJECTED: Metric = Metric::counter("relay.station.frames_rejected")
        .with_description("Frames dropped for wrong size or failed decode")
        .with_unit(Unit::Count)
        .with_labels(&["station", "format", "reason"]);

    /// Acks produced for accepted frames.
    pub const ACKS_SENT: Metric = Metric::counter("relay.station.acks_sent")
        .with_description("Acks produced for accepted frames")
        .with_unit(Unit::Count)
        .with_labels(STATION_LABELS);

    /// Events delivered to the sink.
    pub const EVENTS_DELIVERED: Metric = Metric::counter("relay.station.events_delivered")
        .with_description("Events delivered to the sink")
        .with_unit(Unit::Count)
        .with_labels(STATION_LABELS);

    /// Events that exhausted their attempts and went back on the queue.
    pub const EVENTS_REQUEUED: Metric = Metric::counter("relay.station.events_requeued")
        .with_description("Events that exhausted their delivery attempts and were requeued")
        .with_unit(Unit::Count)
        .with_labels(STATION_LABELS);

    /// Delivery attempts needed per flush.
    pub const DELIVERY_ATTEMPTS: Metric = Metric::histogram("relay.station.delivery_attempts")
        .with_description("Delivery attempts made per flushed event")
        .with_unit(Unit::Count)
        .with_labels(STATION_LABELS);

    /// Events waiting in the outbox.
    pub const OUTBOX_DEPTH: Metric = Metric::gauge("relay.station.outbox_depth")
        .with_description("Events waiting in the outbox")
        .with_unit(Unit::Count)
        .with_labels(STATION_LABELS);

    /// All station metrics.
    pub const ALL: &[&Metric] = &[
        &FRAMES_RECEIVED,
        &FRAMES_REJECTED,
        &ACKS_SENT,
        &EVENTS_DELIVERED,
        &EVENTS_REQUEUED,
        &DELIVERY_ATTEMPTS,
        &OUTBOX_DEPTH,
    ];
}

/// Labels identifying a station and the wire format it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationLabels {
    /// Station name from configuration.
    pub station: String,
    /// Wire format name.
    pub format: String,
}

impl StationLabels {
    /// Create labels for a station.
    pub fn new(station: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            format: format.into(),
        }
    }

    /// Labels as (key, value) pairs for the `metrics` macros.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![
            ("station", self.station.clone()),
            ("format", self.format.clone()),
        ]
    }

    /// Labels plus extra pairs.
    pub fn with(&self, extra: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
        let mut labels = self.to_labels();
        labels.extend_from_slice(extra);
        labels
    }
}

/// Register descriptions for every station metric. Call once after installing
/// a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_labels() {
        let labels = StationLabels::new("base", "compact");
        let pairs = labels.to_labels();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("station", "base".to_string())));
        assert!(pairs.contains(&("format", "compact".to_string())));
    }

    #[test]
    fn test_station_labels_with_extra() {
        let labels = StationLabels::new("base", "extended");
        let pairs = labels.with(&[("reason", "size".to_string())]);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&("reason", "size".to_string())));
    }

    #[test]
    fn test_metric_definitions() {
        assert_eq!(
            metric_defs::FRAMES_RECEIVED.name,
            "relay.station.frames_received"
        );
        assert_eq!(metric_defs::FRAMES_RECEIVED.kind, MetricKind::Counter);
        assert_eq!(metric_defs::DELIVERY_ATTEMPTS.kind, MetricKind::Histogram);
        assert_eq!(metric_defs::OUTBOX_DEPTH.kind, MetricKind::Gauge);
        assert_eq!(metric_defs::FRAMES_REJECTED.labels, &["station", "format", "reason"]);
        assert_eq!(metric_defs::ALL.len(), 7);
    }

    #[test]
    fn test_metric_minimal() {
        const MINIMAL: Metric = Metric::gauge("minimal");
        assert_eq!(MINIMAL.description, "");
        assert_eq!(MINIMAL.unit, None);
        assert_eq!(MINIMAL.labels, &[] as &[&str]);
    }

    #[test]
    fn test_describe_without_recorder() {
        // No recorder installed: describing must be a harmless no-op.
        describe_metrics();
    }
}
