//! Utility functions for the matchmaking client

use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// Generate a correlation id for an outbound request
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Multiply a delay by `factor`, never exceeding `cap`
pub fn scaled_delay(delay: Duration, factor: u32, cap: Duration) -> Duration {
    delay.checked_mul(factor).unwrap_or(cap).min(cap)
}

/// Render a wait in seconds as `m:ss`
pub fn format_wait(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
