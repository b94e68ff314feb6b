//! Replay Matchmaking - client SDK for the replay-api matchmaking endpoints
//!
//! This crate provides the HTTP transport for joining and leaving queues,
//! a backoff-aware session status poller, and a periodic pool stats
//! subscription, tied together by [`MatchmakingSdk`].

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod polling;
pub mod pool;
pub mod sdk;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{MatchmakingError, Result};
pub use types::*;

// Re-export key components
pub use client::{HttpMatchmakingClient, MatchmakingTransport};
pub use polling::{PollCallbacks, PollOptions, PollPhase, PollSnapshot, SessionPoller};
pub use pool::PoolSubscription;
pub use sdk::MatchmakingSdk;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
