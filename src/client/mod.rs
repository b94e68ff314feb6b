//! HTTP transport for the replay-api matchmaking endpoints
//!
//! One request, one response: this layer never retries. Resilience belongs
//! to the polling engine in [`crate::polling`].

pub mod auth;
pub mod http;
pub mod routes;

pub use auth::{NoAuth, StaticTokenProvider, TokenProvider};
pub use http::HttpMatchmakingClient;
pub use routes::RouteBuilder;

use crate::error::Result;
use crate::types::{JoinQueueRequest, PoolQuery, PoolStats, QueueSession};
use async_trait::async_trait;

/// Request/response primitives against the matchmaking backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchmakingTransport: Send + Sync {
    /// Place a player (or squad) in the queue
    async fn join_queue(&self, request: &JoinQueueRequest) -> Result<QueueSession>;

    /// Remove a session from the queue
    async fn leave_queue(&self, session_id: &str) -> Result<()>;

    /// Read the current state of a session
    async fn get_session_status(&self, session_id: &str) -> Result<QueueSession>;

    /// Read aggregate queue statistics
    async fn get_pool_stats(&self, query: &PoolQuery) -> Result<PoolStats>;
}
