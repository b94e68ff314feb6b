//! reqwest-backed implementation of [`MatchmakingTransport`]

use crate::client::auth::{NoAuth, StaticTokenProvider, TokenProvider};
use crate::client::routes::RouteBuilder;
use crate::client::MatchmakingTransport;
use crate::config::{ApiSettings, AppConfig};
use crate::error::{MatchmakingError, Result};
use crate::metrics::MetricsCollector;
use crate::types::{
    JoinQueueRequest, JoinQueueResponse, PoolQuery, PoolStats, QueueSession,
    SessionStatusResponse,
};
use crate::utils::generate_request_id;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for the matchmaking endpoints
pub struct HttpMatchmakingClient {
    http: reqwest::Client,
    routes: RouteBuilder,
    tokens: Arc<dyn TokenProvider>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HttpMatchmakingClient {
    /// Create a client from API settings and an explicit token source
    pub fn new(settings: &ApiSettings, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| MatchmakingError::Configuration {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            routes: RouteBuilder::new(&settings.base_url)?,
            tokens,
            metrics: None,
        })
    }

    /// Create a client whose token comes from `api.auth_token`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let tokens: Arc<dyn TokenProvider> = match &config.api.auth_token {
            Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
            None => Arc::new(NoAuth),
        };
        Self::new(&config.api, tokens)
    }

    /// Record request durations into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn routes(&self) -> &RouteBuilder {
        &self.routes
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, generate_request_id());
        match self.tokens.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request; only network-level failures are errors here
    async fn send(&self, operation: &'static str, builder: RequestBuilder) -> Result<Response> {
        let start = Instant::now();
        let result = builder.send().await;
        let elapsed = start.elapsed();

        if let Some(metrics) = &self.metrics {
            metrics.record_request(operation, result.is_ok(), elapsed);
        }

        match result {
            Ok(response) => {
                debug!(
                    "{} -> {} in {:.2}ms",
                    operation,
                    response.status(),
                    elapsed.as_secs_f64() * 1000.0
                );
                Ok(response)
            }
            Err(e) => {
                warn!("{} request failed: {}", operation, e);
                Err(e.into())
            }
        }
    }
}

/// Status code and backend-provided text of a non-success response
async fn failure_details(response: Response) -> (u16, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string()
    } else {
        body
    };
    (status.as_u16(), message)
}

fn require_session_id(session_id: &str) -> Result<()> {
    if session_id.trim().is_empty() {
        return Err(MatchmakingError::validation("session id must not be empty"));
    }
    Ok(())
}

#[async_trait]
impl MatchmakingTransport for HttpMatchmakingClient {
    async fn join_queue(&self, request: &JoinQueueRequest) -> Result<QueueSession> {
        if request.player_id.trim().is_empty() {
            return Err(MatchmakingError::validation("player id must not be empty"));
        }

        let builder = self
            .request(Method::POST, self.routes.join_queue())
            .json(request);
        let response = self.send("join_queue", builder).await?;

        if !response.status().is_success() {
            let (status, message) = failure_details(response).await;
            return Err(MatchmakingError::QueueJoin { status, message });
        }

        let body: JoinQueueResponse = response.json().await?;
        Ok(body.into())
    }

    async fn leave_queue(&self, session_id: &str) -> Result<()> {
        require_session_id(session_id)?;

        let builder = self.request(Method::DELETE, self.routes.leave_queue(session_id));
        let response = self.send("leave_queue", builder).await?;

        if !response.status().is_success() {
            let (status, message) = failure_details(response).await;
            return Err(MatchmakingError::QueueLeave { status, message });
        }

        Ok(())
    }

    async fn get_session_status(&self, session_id: &str) -> Result<QueueSession> {
        require_session_id(session_id)?;

        let builder = self.request(Method::GET, self.routes.session_status(session_id));
        let response = self.send("get_session_status", builder).await?;

        if !response.status().is_success() {
            let (status, message) = failure_details(response).await;
            return Err(MatchmakingError::StatusFetch { status, message });
        }

        let body: SessionStatusResponse = response.json().await?;
        Ok(body.into())
    }

    async fn get_pool_stats(&self, query: &PoolQuery) -> Result<PoolStats> {
        if query.game_id.trim().is_empty() {
            return Err(MatchmakingError::validation("game id must not be empty"));
        }

        let builder = self.request(Method::GET, self.routes.pool_stats(query));
        let response = self.send("get_pool_stats", builder).await?;

        if !response.status().is_success() {
            let (status, message) = failure_details(response).await;
            return Err(MatchmakingError::PoolStatsFetch { status, message });
        }

        Ok(response.json().await?)
    }
}
