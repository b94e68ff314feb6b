//! Matchmaking SDK facade
//!
//! [`MatchmakingSdk`] bundles a transport, a session poller and optional
//! metrics behind the operations the UI layer calls. Each instance owns at
//! most one session poll loop.

use crate::client::{HttpMatchmakingClient, MatchmakingTransport};
use crate::config::AppConfig;
use crate::error::{MatchmakingError, Result};
use crate::metrics::MetricsCollector;
use crate::polling::{
    PollCallbacks, PollOptions, PollSnapshot, PollTimer, SessionPoller, TokioTimer,
};
use crate::pool::{PoolSubscription, DEFAULT_POOL_REFRESH_INTERVAL};
use crate::types::{JoinQueueRequest, PoolQuery, PoolStats, QueueSession};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Client-side entry point for queue sessions and pool stats
pub struct MatchmakingSdk {
    transport: Arc<dyn MatchmakingTransport>,
    poller: SessionPoller,
    timer: Arc<dyn PollTimer>,
    metrics: Option<Arc<MetricsCollector>>,
    poll_options: PollOptions,
    pool_refresh_interval: Duration,
}

impl MatchmakingSdk {
    /// Create an SDK over any transport with default timings
    pub fn new(transport: Arc<dyn MatchmakingTransport>) -> Self {
        Self {
            poller: SessionPoller::new(transport.clone()),
            transport,
            timer: Arc::new(TokioTimer),
            metrics: None,
            poll_options: PollOptions::default(),
            pool_refresh_interval: DEFAULT_POOL_REFRESH_INTERVAL,
        }
    }

    /// Create an SDK talking HTTP to the backend described by `config`
    pub fn from_config(config: &AppConfig, metrics: Option<Arc<MetricsCollector>>) -> Result<Self> {
        let mut client = HttpMatchmakingClient::from_config(config)?;
        if let Some(metrics) = &metrics {
            client = client.with_metrics(metrics.clone());
        }

        let mut sdk = Self::new(Arc::new(client))
            .with_poll_options(config.poll_options())
            .with_pool_refresh_interval(config.pool_refresh_interval());
        if let Some(metrics) = metrics {
            sdk = sdk.with_metrics(metrics);
        }
        Ok(sdk)
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self.rebuild_poller();
        self
    }

    /// Replace the timer used between poll ticks
    pub fn with_timer(mut self, timer: Arc<dyn PollTimer>) -> Self {
        self.timer = timer;
        self.rebuild_poller();
        self
    }

    fn rebuild_poller(&mut self) {
        let mut poller =
            SessionPoller::new(self.transport.clone()).with_timer(self.timer.clone());
        if let Some(metrics) = &self.metrics {
            poller = poller.with_metrics(metrics.clone());
        }
        self.poller = poller;
    }

    /// Default options for [`MatchmakingSdk::start_polling`]
    pub fn with_poll_options(mut self, options: PollOptions) -> Self {
        self.poll_options = options;
        self
    }

    pub fn with_pool_refresh_interval(mut self, interval: Duration) -> Self {
        self.pool_refresh_interval = interval;
        self
    }

    pub fn poll_options(&self) -> PollOptions {
        self.poll_options
    }

    pub fn metrics(&self) -> Option<Arc<MetricsCollector>> {
        self.metrics.clone()
    }

    /// Join the matchmaking queue
    pub async fn join_queue(&self, request: &JoinQueueRequest) -> Result<QueueSession> {
        if request.player_id.trim().is_empty() {
            return Err(MatchmakingError::validation("player id must not be empty"));
        }
        if request.preferences.game_id.trim().is_empty() {
            return Err(MatchmakingError::validation("game id must not be empty"));
        }

        let session = self.transport.join_queue(request).await?;
        info!(
            "Player {} joined queue: session {} at position {}",
            request.player_id, session.session_id, session.queue_position
        );
        Ok(session)
    }

    /// Leave the queue, stopping any polling of that session first
    pub async fn leave_queue(&self, session_id: &str) -> Result<()> {
        if session_id.trim().is_empty() {
            return Err(MatchmakingError::validation("session id must not be empty"));
        }

        self.poller.stop_session(session_id);
        self.transport.leave_queue(session_id).await?;
        info!("Left queue: session {}", session_id);
        Ok(())
    }

    /// Fetch a session's current state once
    pub async fn get_session_status(&self, session_id: &str) -> Result<QueueSession> {
        if session_id.trim().is_empty() {
            return Err(MatchmakingError::validation("session id must not be empty"));
        }
        self.transport.get_session_status(session_id).await
    }

    /// Fetch aggregate queue statistics once
    pub async fn get_pool_stats(
        &self,
        game_id: &str,
        game_mode: Option<&str>,
        region: Option<&str>,
    ) -> Result<PoolStats> {
        if game_id.trim().is_empty() {
            return Err(MatchmakingError::validation("game id must not be empty"));
        }
        let query = PoolQuery {
            game_id: game_id.to_string(),
            game_mode: game_mode.map(str::to_string),
            region: region.map(str::to_string),
        };
        self.transport.get_pool_stats(&query).await
    }

    /// Track a session with the SDK's default poll options
    pub fn start_polling(&self, session_id: &str, callbacks: PollCallbacks) -> Result<()> {
        self.poller
            .start_polling(session_id, callbacks, self.poll_options)
    }

    /// Track a session with explicit poll options
    pub fn start_polling_with(
        &self,
        session_id: &str,
        callbacks: PollCallbacks,
        options: PollOptions,
    ) -> Result<()> {
        self.poller.start_polling(session_id, callbacks, options)
    }

    /// Cancel the current poll loop; safe to call at any time
    pub fn stop_polling(&self) {
        self.poller.stop_polling();
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_polling()
    }

    pub fn poll_snapshot(&self) -> PollSnapshot {
        self.poller.snapshot()
    }

    /// Refresh pool stats now and then every configured interval
    pub fn subscribe_to_pool_updates<F>(
        &self,
        game_id: &str,
        game_mode: Option<&str>,
        region: Option<&str>,
        callback: F,
    ) -> Result<PoolSubscription>
    where
        F: Fn(PoolStats) + Send + Sync + 'static,
    {
        self.subscribe_to_pool_updates_every(
            game_id,
            game_mode,
            region,
            self.pool_refresh_interval,
            callback,
        )
    }

    /// Refresh pool stats now and then every `interval`
    pub fn subscribe_to_pool_updates_every<F>(
        &self,
        game_id: &str,
        game_mode: Option<&str>,
        region: Option<&str>,
        interval: Duration,
        callback: F,
    ) -> Result<PoolSubscription>
    where
        F: Fn(PoolStats) + Send + Sync + 'static,
    {
        let query = PoolQuery {
            game_id: game_id.to_string(),
            game_mode: game_mode.map(str::to_string),
            region: region.map(str::to_string),
        };
        PoolSubscription::spawn(
            self.transport.clone(),
            query,
            interval,
            callback,
            self.metrics.clone(),
        )
    }
}
