//! In-process metrics for rule evaluation

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Monotonic counter
#[derive(Debug, Default)]
pub struct Counter {
    value: RwLock<u64>,
}

impl Counter {
    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, value: u64) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) += value;
    }

    pub fn get(&self) -> u64 {
        *self.value.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Observations kept for percentiles
pub const DEFAULT_HISTOGRAM_WINDOW: usize = 1024;

#[derive(Debug, Default)]
struct HistogramState {
    count: usize,
    sum: f64,
    recent: VecDeque<f64>,
}

/// Distribution of observed values, in milliseconds for durations.
///
/// Count, sum and average cover every observation. Percentiles are computed
/// over the most recent `window` observations only, so memory stays fixed
/// however long the engine runs.
#[derive(Debug)]
pub struct Histogram {
    window: usize,
    state: RwLock<HistogramState>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::with_window(DEFAULT_HISTOGRAM_WINDOW)
    }
}

impl Histogram {
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            state: RwLock::new(HistogramState {
                recent: VecDeque::with_capacity(window),
                ..HistogramState::default()
            }),
        }
    }

    pub fn observe(&self, value: f64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.count += 1;
        state.sum += value;
        if state.recent.len() == self.window {
            state.recent.pop_front();
        }
        state.recent.push_back(value);
    }

    pub fn observe_duration(&self, duration: Duration) {
        self.observe(duration.as_secs_f64() * 1000.0);
    }

    /// Total number of observations
    pub fn count(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).count
    }

    pub fn sum(&self) -> f64 {
        self.state.read().unwrap_or_else(PoisonError::into_inner).sum
    }

    pub fn avg(&self) -> f64 {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.count == 0 {
            0.0
        } else {
            state.sum / state.count as f64
        }
    }

    /// Observations currently retained for percentiles
    pub fn retained(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).recent.len()
    }

    /// Nearest-rank percentile (0-100) over the retained window
    pub fn percentile(&self, p: f64) -> f64 {
        let mut values: Vec<f64> = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .recent
            .iter()
            .copied()
            .collect();
        if values.is_empty() {
            return 0.0;
        }

        values.sort_by(f64::total_cmp);
        let index = ((p.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f64).round() as usize;
        values[index]
    }
}

/// Metrics sink used by the rule engine
pub trait Metrics: Send + Sync {
    fn counter(&self, name: &str) -> Arc<Counter>;

    fn histogram(&self, name: &str) -> Arc<Histogram>;

    /// Record the duration of `operation` under `<operation>_duration_ms`
    fn record_execution_time(&self, operation: &str, duration: Duration);

    /// Bump `errors_<error_type>`
    fn record_error(&self, error_type: &str);
}

/// Point-in-time copy of all metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub histograms: BTreeMap<String, HistogramSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramSummary {
    pub count: usize,
    pub avg: f64,
    pub p50: f64,
    pub p95: f64,
}

/// Registry of named counters and histograms
#[derive(Debug, Default)]
pub struct MetricsCollector {
    counters: RwLock<HashMap<String, Arc<Counter>>>,
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter, zero if it was never touched
    pub fn counter_value(&self, name: &str) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|c| c.get())
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, c)| (name.clone(), c.get()))
            .collect();
        let histograms = self
            .histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, h)| {
                let summary = HistogramSummary {
                    count: h.count(),
                    avg: h.avg(),
                    p50: h.percentile(50.0),
                    p95: h.percentile(95.0),
                };
                (name.clone(), summary)
            })
            .collect();

        MetricsSnapshot {
            counters,
            histograms,
        }
    }
}

impl Metrics for MetricsCollector {
    fn counter(&self, name: &str) -> Arc<Counter> {
        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn histogram(&self, name: &str) -> Arc<Histogram> {
        self.histograms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn record_execution_time(&self, operation: &str, duration: Duration) {
        self.histogram(&format!("{}_duration_ms", operation))
            .observe_duration(duration);
    }

    fn record_error(&self, error_type: &str) {
        self.counter(&format!("errors_{}", error_type)).inc();
    }
}
