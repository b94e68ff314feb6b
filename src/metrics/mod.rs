//! Metrics for the replay-matchmaking client
//!
//! Counters and histograms for polling, pool refreshes and backend requests,
//! collected in a Prometheus registry the embedding application can expose.

pub mod collector;

pub use collector::{MetricsCollector, PollMetrics, RequestMetrics};
