//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for session polling, pool stats
//! refreshes and backend requests.

use crate::types::SessionStatus;
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the matchmaking client
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Session polling metrics
    poll_metrics: PollMetrics,

    /// Backend request metrics
    request_metrics: RequestMetrics,
}

/// Session polling metrics
#[derive(Clone)]
pub struct PollMetrics {
    /// Poll ticks by outcome (success, failure)
    pub polls_total: IntCounterVec,

    /// Poll loops that stopped after exhausting their retries
    pub give_ups_total: IntCounter,

    /// Terminal statuses observed by the poller
    pub terminal_statuses_total: IntCounterVec,

    /// Poll loops currently running (0 or 1 per SDK instance)
    pub active_polls: IntGauge,

    /// Pool stats refreshes by outcome
    pub pool_refreshes_total: IntCounterVec,
}

/// Backend request metrics
#[derive(Clone)]
pub struct RequestMetrics {
    /// Requests by operation and result
    pub requests_total: IntCounterVec,

    /// Request round-trip time by operation
    pub request_duration: HistogramVec,
}

fn outcome_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let poll_metrics = PollMetrics::new(&registry)?;
        let request_metrics = RequestMetrics::new(&registry)?;

        Ok(Self {
            registry,
            poll_metrics,
            request_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get polling metrics
    pub fn polling(&self) -> &PollMetrics {
        &self.poll_metrics
    }

    /// Get request metrics
    pub fn requests(&self) -> &RequestMetrics {
        &self.request_metrics
    }

    /// Record the outcome of one poll tick
    pub fn record_poll(&self, success: bool) {
        self.poll_metrics
            .polls_total
            .with_label_values(&[outcome_label(success)])
            .inc();
    }

    /// Record a poll loop giving up after max retries
    pub fn record_give_up(&self) {
        self.poll_metrics.give_ups_total.inc();
    }

    /// Record a terminal status that ended a poll loop
    pub fn record_terminal_status(&self, status: SessionStatus) {
        self.poll_metrics
            .terminal_statuses_total
            .with_label_values(&[status.as_str()])
            .inc();
    }

    /// Track a poll loop starting or ending
    pub fn set_polling_active(&self, active: bool) {
        self.poll_metrics.active_polls.set(i64::from(active));
    }

    /// Record the outcome of one pool stats refresh
    pub fn record_pool_refresh(&self, success: bool) {
        self.poll_metrics
            .pool_refreshes_total
            .with_label_values(&[outcome_label(success)])
            .inc();
    }

    /// Record a backend request round trip
    pub fn record_request(&self, operation: &str, success: bool, duration: Duration) {
        self.request_metrics
            .requests_total
            .with_label_values(&[operation, outcome_label(success)])
            .inc();

        self.request_metrics
            .request_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Render all metrics in the Prometheus text format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl PollMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let polls_total = IntCounterVec::new(
            Opts::new(
                "replay_matchmaking_polls_total",
                "Session status poll ticks by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(polls_total.clone()))?;

        let give_ups_total = IntCounter::new(
            "replay_matchmaking_poll_give_ups_total",
            "Poll loops stopped after exhausting retries",
        )?;
        registry.register(Box::new(give_ups_total.clone()))?;

        let terminal_statuses_total = IntCounterVec::new(
            Opts::new(
                "replay_matchmaking_terminal_statuses_total",
                "Terminal session statuses observed",
            ),
            &["status"],
        )?;
        registry.register(Box::new(terminal_statuses_total.clone()))?;

        let active_polls = IntGauge::new(
            "replay_matchmaking_active_polls",
            "Poll loops currently running",
        )?;
        registry.register(Box::new(active_polls.clone()))?;

        let pool_refreshes_total = IntCounterVec::new(
            Opts::new(
                "replay_matchmaking_pool_refreshes_total",
                "Pool stats refreshes by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(pool_refreshes_total.clone()))?;

        Ok(Self {
            polls_total,
            give_ups_total,
            terminal_statuses_total,
            active_polls,
            pool_refreshes_total,
        })
    }
}

impl RequestMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new(
                "replay_matchmaking_requests_total",
                "Backend requests by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "replay_matchmaking_request_duration_seconds",
                "Backend request round-trip time",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["operation"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            requests_total,
            request_duration,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
