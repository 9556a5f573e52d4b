//! In-process metrics rendered as Prometheus text.

pub mod metrics;

pub use metrics::NodeMetrics;
