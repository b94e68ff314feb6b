//! Test fixtures and fake implementations for integration testing
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use replay_matchmaking::error::{MatchmakingError, Result};
use replay_matchmaking::polling::PollTimer;
use replay_matchmaking::types::{
    JoinQueueRequest, PoolQuery, PoolStats, QueueHealth, QueueSession, SessionStatus,
};
use replay_matchmaking::MatchmakingTransport;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Build a session in the given status
pub fn session(session_id: &str, status: SessionStatus) -> QueueSession {
    QueueSession {
        session_id: session_id.to_string(),
        status,
        queue_position: 4,
        estimated_wait_seconds: 45,
        elapsed_seconds: 10,
        match_id: None,
        queued_at: None,
    }
}

/// Build a network-style failure
pub fn network_error() -> MatchmakingError {
    MatchmakingError::Transport {
        message: "connection reset by peer".to_string(),
    }
}

/// Build a pool snapshot for `game_id`
pub fn pool_stats(game_id: &str) -> PoolStats {
    PoolStats {
        pool_id: format!("pool-{}", game_id),
        game_id: game_id.to_string(),
        game_mode: "competitive".to_string(),
        region: "eu-west".to_string(),
        total_players: 64,
        average_wait_time_seconds: 32.5,
        players_by_tier: BTreeMap::from([("free".to_string(), 60), ("pro".to_string(), 4)]),
        estimated_match_time_seconds: 28.0,
        queue_health: QueueHealth::Healthy,
        timestamp: replay_matchmaking::utils::current_timestamp(),
    }
}

/// Transport that answers status requests from a script
///
/// Once the script runs dry every status request reports `searching`.
#[derive(Default)]
pub struct ScriptedTransport {
    statuses: Mutex<VecDeque<Result<QueueSession>>>,
    latency: Mutex<Option<Duration>>,
    status_calls: AtomicUsize,
    leave_calls: AtomicUsize,
    join_calls: AtomicUsize,
    pool_calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_session(&self, session: QueueSession) -> &Self {
        self.statuses.lock().unwrap().push_back(Ok(session));
        self
    }

    pub fn push_status(&self, status: SessionStatus) -> &Self {
        self.push_session(session("s1", status))
    }

    pub fn push_failure(&self) -> &Self {
        self.statuses.lock().unwrap().push_back(Err(network_error()));
        self
    }

    pub fn push_failures(&self, count: usize) -> &Self {
        for _ in 0..count {
            self.push_failure();
        }
        self
    }

    /// Delay every status response by `latency`
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn leave_calls(&self) -> usize {
        self.leave_calls.load(Ordering::SeqCst)
    }

    pub fn join_calls(&self) -> usize {
        self.join_calls.load(Ordering::SeqCst)
    }

    pub fn pool_calls(&self) -> usize {
        self.pool_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchmakingTransport for ScriptedTransport {
    async fn join_queue(&self, request: &JoinQueueRequest) -> Result<QueueSession> {
        self.join_calls.fetch_add(1, Ordering::SeqCst);
        let mut joined = session("s1", SessionStatus::Queued);
        joined.elapsed_seconds = 0;
        joined.queued_at = Some(replay_matchmaking::utils::current_timestamp());
        if request.squad_id.is_some() {
            joined.queue_position = 1;
        }
        Ok(joined)
    }

    async fn leave_queue(&self, _session_id: &str) -> Result<()> {
        self.leave_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_session_status(&self, session_id: &str) -> Result<QueueSession> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = self.statuses.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(mut found)) => {
                found.session_id = session_id.to_string();
                Ok(found)
            }
            Some(Err(e)) => Err(e),
            None => Ok(session(session_id, SessionStatus::Searching)),
        }
    }

    async fn get_pool_stats(&self, query: &PoolQuery) -> Result<PoolStats> {
        self.pool_calls.fetch_add(1, Ordering::SeqCst);
        Ok(pool_stats(&query.game_id))
    }
}

/// Timer that records every scheduled delay before sleeping on the Tokio clock
#[derive(Default)]
pub struct RecordingTimer {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn delays_ms(&self) -> Vec<u128> {
        self.delays().iter().map(Duration::as_millis).collect()
    }
}

#[async_trait]
impl PollTimer for RecordingTimer {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
        tokio::time::sleep(delay).await;
    }
}

/// Requests observed by the fake backend
#[derive(Default)]
pub struct BackendState {
    /// Scripted status responses; empty means `searching`
    pub statuses: Mutex<VecDeque<(StatusCode, Value)>>,
    pub auth_headers: Mutex<Vec<Option<String>>>,
    pub join_bodies: Mutex<Vec<Value>>,
    pub left_sessions: Mutex<Vec<String>>,
    pub pool_queries: Mutex<Vec<HashMap<String, String>>>,
    pub status_requests: AtomicUsize,
}

impl BackendState {
    pub fn push_status(&self, code: StatusCode, body: Value) {
        self.statuses.lock().unwrap().push_back((code, body));
    }

    fn record_auth(&self, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(auth);
    }
}

/// In-process stand-in for the replay-api matchmaking endpoints
pub struct FakeBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
    server: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        let app = Router::new()
            .route("/matchmaking/queue", post(join_queue_handler))
            .route("/matchmaking/queue/{session_id}", delete(leave_queue_handler))
            .route("/matchmaking/session/{session_id}", get(session_handler))
            .route("/matchmaking/pools/{game_id}", get(pool_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn join_queue_handler(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth(&headers);
    state.join_bodies.lock().unwrap().push(body.clone());

    if body["player_id"] == "banned" {
        return (StatusCode::FORBIDDEN, "player is banned").into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "session_id": "sess-1",
            "status": "queued",
            "estimated_wait_seconds": 60,
            "queue_position": 7,
            "queued_at": "2026-10-17T12:00:00Z"
        })),
    )
        .into_response()
}

async fn leave_queue_handler(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Response {
    state.record_auth(&headers);
    if session_id == "missing" {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.left_sessions.lock().unwrap().push(session_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn session_handler(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Response {
    state.record_auth(&headers);
    state.status_requests.fetch_add(1, Ordering::SeqCst);

    if session_id == "slow" {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    let scripted = state.statuses.lock().unwrap().pop_front();
    match scripted {
        Some((code, body)) => (code, Json(body)).into_response(),
        None => Json(json!({
            "session_id": session_id,
            "status": "searching",
            "elapsed_time": 12,
            "estimated_wait": 30,
            "queue_position": 3
        }))
        .into_response(),
    }
}

async fn pool_handler(
    State(state): State<Arc<BackendState>>,
    Path(game_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.pool_queries.lock().unwrap().push(params.clone());
    Json(json!({
        "pool_id": format!("pool-{}", game_id),
        "game_id": game_id,
        "game_mode": params.get("game_mode").cloned().unwrap_or_else(|| "any".to_string()),
        "region": params.get("region").cloned().unwrap_or_else(|| "global".to_string()),
        "total_players": 128,
        "average_wait_time_seconds": 41.0,
        "players_by_tier": {"free": 100, "pro": 28},
        "estimated_match_time_seconds": 37.5,
        "queue_health": "healthy",
        "timestamp": "2026-10-17T12:00:00Z"
    }))
    .into_response()
}
