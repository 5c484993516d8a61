//! Observability module
//!
//! Counters and histograms recorded by the rule engine. Structured logs go
//! through `tracing`.

pub mod metrics;

pub use metrics::{Counter, Histogram, HistogramSummary, Metrics, MetricsCollector, MetricsSnapshot};
