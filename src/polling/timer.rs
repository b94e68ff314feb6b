//! Deferred scheduling for poll ticks

use async_trait::async_trait;
use std::time::Duration;

/// Waits out the delay before the next poll tick
///
/// Every delay the poll loop schedules goes through this trait, so a test
/// can record the exact backoff schedule.
#[async_trait]
pub trait PollTimer: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Timer backed by `tokio::time::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

#[async_trait]
impl PollTimer for TokioTimer {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
