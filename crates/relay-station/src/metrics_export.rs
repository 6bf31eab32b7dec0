//! In-memory metrics recorder and JSON export.
//!
//! `relayctl station` installs an [`InMemoryRecorder`] as the global recorder
//! and writes its [`MetricsExport`] when the input ends. Tests can scope one
//! to a closure with `metrics::with_local_recorder`.
//!
//! Export shape:
//!
//! ```json
//! {
//!   "timestamp": "2025-06-01T14:30:00+00:00",
//!   "metrics": {
//!     "relay.station.frames_rejected": {
//!       "kind": "counter",
//!       "total": 2,
//!       "labels": { "reason": { "decode": 1, "size": 1 }, "station": { "base": 2 } }
//!     }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use relay_metrics::metrics::{
    Counter, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use serde::{Deserialize, Serialize};

/// Recorded samples for one histogram key.
#[derive(Debug, Default)]
struct Samples(Mutex<Vec<f64>>);

impl HistogramFn for Samples {
    fn record(&self, value: f64) {
        self.0.lock().push(value);
    }
}

/// A recorder that keeps every metric in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    counters: Mutex<HashMap<Key, Arc<AtomicU64>>>,
    gauges: Mutex<HashMap<Key, Arc<AtomicU64>>>,
    histograms: Mutex<HashMap<Key, Arc<Samples>>>,
    descriptions: Mutex<BTreeMap<String, String>>,
}

impl InMemoryRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every counter named `name` whose labels include all of `labels`.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.counters
            .lock()
            .iter()
            .filter(|(key, _)| matches_key(key, name, labels))
            .map(|(_, value)| value.load(Ordering::Relaxed))
            .sum()
    }

    /// Current value of the gauge `name` summed over its label sets.
    pub fn gauge(&self, name: &str) -> Option<f64> {
        let gauges = self.gauges.lock();
        let mut values = gauges
            .iter()
            .filter(|(key, _)| key.name() == name)
            .map(|(_, value)| f64::from_bits(value.load(Ordering::Relaxed)))
            .peekable();
        values.peek()?;
        Some(values.sum())
    }

    /// All samples recorded for the histogram `name`.
    pub fn histogram(&self, name: &str) -> Vec<f64> {
        self.histograms
            .lock()
            .iter()
            .filter(|(key, _)| key.name() == name)
            .flat_map(|(_, samples)| samples.0.lock().clone())
            .collect()
    }

    /// Snapshot every metric recorded so far.
    pub fn export(&self) -> MetricsExport {
        let mut metrics = BTreeMap::new();
        let descriptions = self.descriptions.lock().clone();

        for (key, value) in self.counters.lock().iter() {
            let count = value.load(Ordering::Relaxed);
            let entry = metrics
                .entry(key.name().to_string())
                .or_insert_with(|| MetricValue::Counter(CounterValue::default()));
            if let MetricValue::Counter(counter) = entry {
                counter.total += count;
                for label in key.labels() {
                    *counter
                        .labels
                        .entry(label.key().to_string())
                        .or_default()
                        .entry(label.value().to_string())
                        .or_default() += count;
                }
            }
        }

        for (key, value) in self.gauges.lock().iter() {
            let current = f64::from_bits(value.load(Ordering::Relaxed));
            let entry = metrics
                .entry(key.name().to_string())
                .or_insert_with(|| MetricValue::Gauge(GaugeValue::default()));
            if let MetricValue::Gauge(gauge) = entry {
                gauge.total += current;
                for label in key.labels() {
                    *gauge
                        .labels
                        .entry(label.key().to_string())
                        .or_default()
                        .entry(label.value().to_string())
                        .or_default() += current;
                }
            }
        }

        let mut samples_by_name: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (key, samples) in self.histograms.lock().iter() {
            samples_by_name
                .entry(key.name().to_string())
                .or_default()
                .extend(samples.0.lock().iter().copied());
        }
        for (name, samples) in samples_by_name {
            metrics.insert(name, MetricValue::Histogram(HistogramValue::from_samples(&samples)));
        }

        MetricsExport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            descriptions,
            metrics,
        }
    }

    fn describe(&self, key: KeyName, description: SharedString) {
        self.descriptions
            .lock()
            .insert(key.as_str().to_string(), String::from(&*description));
    }
}

fn matches_key(key: &Key, name: &str, labels: &[(&str, &str)]) -> bool {
    key.name() == name
        && labels
            .iter()
            .all(|(k, v)| key.labels().any(|label| label.key() == *k && label.value() == *v))
}

impl Recorder for InMemoryRecorder {
    fn describe_counter(&self, key: KeyName, _unit: Option<Unit>, description: SharedString) {
        self.describe(key, description);
    }

    fn describe_gauge(&self, key: KeyName, _unit: Option<Unit>, description: SharedString) {
        self.describe(key, description);
    }

    fn describe_histogram(&self, key: KeyName, _unit: Option<Unit>, description: SharedString) {
        self.describe(key, description);
    }

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let value = self.counters.lock().entry(key.clone()).or_default().clone();
        Counter::from_arc(value)
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        let value = self.gauges.lock().entry(key.clone()).or_default().clone();
        Gauge::from_arc(value)
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        let samples = self.histograms.lock().entry(key.clone()).or_default().clone();
        Histogram::from_arc(samples)
    }
}

// ============================================================================
// Export types
// ============================================================================

/// A point-in-time snapshot of an [`InMemoryRecorder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsExport {
    /// When the snapshot was taken (RFC 3339, UTC).
    pub timestamp: String,
    /// Metric descriptions registered with the recorder.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub descriptions: BTreeMap<String, String>,
    /// Values keyed by metric name.
    pub metrics: BTreeMap<String, MetricValue>,
}

impl MetricsExport {
    /// Counter total for `name`, if it was recorded.
    pub fn counter(&self, name: &str) -> Option<&CounterValue> {
        match self.metrics.get(name)? {
            MetricValue::Counter(counter) => Some(counter),
            _ => None,
        }
    }
}

/// One exported metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricValue {
    Counter(CounterValue),
    Gauge(GaugeValue),
    Histogram(HistogramValue),
}

/// Counter total with per-label breakdown (label key → label value → count).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterValue {
    pub total: u64,
    #[serde(default)]
    pub labels: BTreeMap<String, BTreeMap<String, u64>>,
}

impl CounterValue {
    /// Count for one label value.
    pub fn by_label(&self, key: &str, value: &str) -> u64 {
        self.labels
            .get(key)
            .and_then(|values| values.get(value))
            .copied()
            .unwrap_or(0)
    }
}

/// Gauge value with per-label breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaugeValue {
    pub total: f64,
    #[serde(default)]
    pub labels: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Histogram summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramValue {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl HistogramValue {
    fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let sum: f64 = samples.iter().sum();
        HistogramValue {
            count: samples.len() as u64,
            sum,
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: sum / samples.len() as f64,
        }
    }
}
