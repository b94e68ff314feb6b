//! Backoff arithmetic for session polling
//!
//! Pure state: no timers, no I/O. The poll loop feeds it outcomes and asks
//! it how long to wait next.

use crate::error::{MatchmakingError, Result};
use crate::utils::scaled_delay;
use std::time::Duration;

/// Growth factor applied to the interval after each consecutive failure
pub const BACKOFF_FACTOR: u32 = 2;

/// Timing and retry limits for one poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay before the first tick and after every successful tick
    pub initial_interval: Duration,
    /// Cap on the backoff delay
    pub max_interval: Duration,
    /// Consecutive failures that end the loop
    pub max_retries: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(2_000),
            max_interval: Duration::from_millis(30_000),
            max_retries: 5,
        }
    }
}

impl PollOptions {
    pub fn validate(&self) -> Result<()> {
        if self.initial_interval.is_zero() {
            return Err(MatchmakingError::validation(
                "initial poll interval must be greater than zero",
            ));
        }
        if self.max_interval < self.initial_interval {
            return Err(MatchmakingError::validation(
                "max poll interval must not be below the initial interval",
            ));
        }
        if self.max_retries == 0 {
            return Err(MatchmakingError::validation("max retries must be at least 1"));
        }
        Ok(())
    }
}

/// What the loop should do after a failed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Try again after `delay`
    Retry { delay: Duration, retry_count: u32 },
    /// Retry budget exhausted; stop polling
    GiveUp { retry_count: u32 },
}

/// Interval and retry counter owned by a single poll loop
#[derive(Debug, Clone)]
pub struct PollState {
    options: PollOptions,
    current_interval: Duration,
    retry_count: u32,
}

impl PollState {
    pub fn new(options: PollOptions) -> Self {
        Self {
            options,
            current_interval: options.initial_interval,
            retry_count: 0,
        }
    }

    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// A tick succeeded: back to the initial cadence
    pub fn record_success(&mut self) {
        self.current_interval = self.options.initial_interval;
        self.retry_count = 0;
    }

    /// A tick failed: count it and grow the interval, or give up
    pub fn record_failure(&mut self) -> FailureOutcome {
        self.retry_count += 1;
        if self.retry_count >= self.options.max_retries {
            return FailureOutcome::GiveUp {
                retry_count: self.retry_count,
            };
        }

        self.current_interval = scaled_delay(
            self.current_interval,
            BACKOFF_FACTOR,
            self.options.max_interval,
        );
        FailureOutcome::Retry {
            delay: self.current_interval,
            retry_count: self.retry_count,
        }
    }
}
