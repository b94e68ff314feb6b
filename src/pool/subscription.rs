//! Fixed-period pool stats subscription

use crate::client::MatchmakingTransport;
use crate::error::{MatchmakingError, Result};
use crate::metrics::MetricsCollector;
use crate::types::{PoolQuery, PoolStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default refresh period for pool stats
pub const DEFAULT_POOL_REFRESH_INTERVAL: Duration = Duration::from_millis(5_000);

/// Receives every successfully fetched pool snapshot
pub type PoolCallback = Arc<dyn Fn(PoolStats) + Send + Sync>;

/// Handle to a running pool stats refresh; dropping it unsubscribes
pub struct PoolSubscription {
    query: PoolQuery,
    handle: Option<JoinHandle<()>>,
}

impl PoolSubscription {
    /// Fetch immediately, then every `period`, until unsubscribed
    pub fn spawn<F>(
        transport: Arc<dyn MatchmakingTransport>,
        query: PoolQuery,
        period: Duration,
        callback: F,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Result<Self>
    where
        F: Fn(PoolStats) + Send + Sync + 'static,
    {
        if query.game_id.trim().is_empty() {
            return Err(MatchmakingError::validation("game id must not be empty"));
        }
        if period.is_zero() {
            return Err(MatchmakingError::validation(
                "pool refresh interval must be greater than zero",
            ));
        }
        let runtime = Handle::try_current().map_err(|_| MatchmakingError::Configuration {
            message: "pool subscriptions require a running Tokio runtime".to_string(),
        })?;

        let callback: PoolCallback = Arc::new(callback);
        let task_query = query.clone();
        let handle = runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match transport.get_pool_stats(&task_query).await {
                    Ok(stats) => {
                        debug!(
                            "Pool {} has {} players ({})",
                            stats.pool_id, stats.total_players, stats.queue_health
                        );
                        if let Some(metrics) = &metrics {
                            metrics.record_pool_refresh(true);
                        }
                        callback(stats);
                    }
                    Err(e) => {
                        if let Some(metrics) = &metrics {
                            metrics.record_pool_refresh(false);
                        }
                        warn!(
                            "Pool stats refresh for {} failed: {}",
                            task_query.game_id, e
                        );
                    }
                }
            }
        });

        info!(
            "Subscribed to pool updates for {} every {:?}",
            query.game_id, period
        );
        Ok(Self {
            query,
            handle: Some(handle),
        })
    }

    pub fn query(&self) -> &PoolQuery {
        &self.query
    }

    /// True until unsubscribed
    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop refreshing. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Unsubscribed from pool updates for {}", self.query.game_id);
        }
    }
}

impl Drop for PoolSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
