//! Polling and pool refresh settings

use serde::{Deserialize, Serialize};

/// Timing knobs for session polling and pool stats refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Delay before the first poll and after every successful poll
    pub initial_interval_ms: u64,
    /// Upper bound for the backoff delay
    pub max_interval_ms: u64,
    /// Consecutive failures after which polling gives up
    pub max_retries: u32,
    /// Fixed period of the pool stats refresh
    pub pool_refresh_interval_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            initial_interval_ms: 2_000,
            max_interval_ms: 30_000,
            max_retries: 5,
            pool_refresh_interval_ms: 5_000,
        }
    }
}
