//! Lightweight in-process metrics.
//!
//! Counters are stored as atomics and can be rendered in Prometheus text
//! format by the host.

pub mod metrics;

pub use metrics::{ClientMetrics, CommandCounter, Counter};
