//! Common types used throughout the matchmaking client
//!
//! Wire types mirror the replay-api JSON payloads field for field; domain
//! types ([`QueueSession`]) are what callbacks and callers see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque, backend-assigned identifier of a queue session
pub type SessionId = String;

/// Identifier of a player
pub type PlayerId = String;

/// Lifecycle status of a queue session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Queued,
    Searching,
    Matched,
    Ready,
    Cancelled,
    Expired,
}

impl SessionStatus {
    /// Statuses after which polling is pointless
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Matched | SessionStatus::Cancelled | SessionStatus::Expired
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Queued => "queued",
            SessionStatus::Searching => "searching",
            SessionStatus::Matched => "matched",
            SessionStatus::Ready => "ready",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player's placement in a remote matchmaking queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSession {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub queue_position: u32,
    pub estimated_wait_seconds: u32,
    pub elapsed_seconds: u64,
    pub match_id: Option<String>,
    pub queued_at: Option<DateTime<Utc>>,
}

/// Acceptable MMR window for a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRange {
    pub min_mmr: u32,
    pub max_mmr: u32,
}

/// Matchmaking preferences sent along with a join request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuePreferences {
    pub game_id: String,
    pub game_mode: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_range: Option<SkillRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ping: Option<u32>,
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default)]
    pub priority_boost: bool,
}

fn default_tier() -> String {
    "free".to_string()
}

impl QueuePreferences {
    pub fn new(
        game_id: impl Into<String>,
        game_mode: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            game_mode: game_mode.into(),
            region: region.into(),
            skill_range: None,
            max_ping: None,
            tier: default_tier(),
            priority_boost: false,
        }
    }
}

/// Body of `POST /matchmaking/queue`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinQueueRequest {
    pub player_id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squad_id: Option<String>,
    pub preferences: QueuePreferences,
    pub player_mmr: u32,
}

/// Response of `POST /matchmaking/queue`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinQueueResponse {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub estimated_wait_seconds: u32,
    pub queue_position: u32,
    pub queued_at: DateTime<Utc>,
}

impl From<JoinQueueResponse> for QueueSession {
    fn from(resp: JoinQueueResponse) -> Self {
        Self {
            session_id: resp.session_id,
            status: resp.status,
            queue_position: resp.queue_position,
            estimated_wait_seconds: resp.estimated_wait_seconds,
            elapsed_seconds: 0,
            match_id: None,
            queued_at: Some(resp.queued_at),
        }
    }
}

/// Response of `GET /matchmaking/session/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub elapsed_time: u64,
    pub estimated_wait: u32,
    #[serde(default)]
    pub queue_position: Option<u32>,
    #[serde(default)]
    pub match_id: Option<String>,
}

impl From<SessionStatusResponse> for QueueSession {
    fn from(resp: SessionStatusResponse) -> Self {
        Self {
            session_id: resp.session_id,
            status: resp.status,
            queue_position: resp.queue_position.unwrap_or(0),
            estimated_wait_seconds: resp.estimated_wait,
            elapsed_seconds: resp.elapsed_time,
            match_id: resp.match_id,
            queued_at: None,
        }
    }
}

/// Health of a matchmaking pool as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueHealth {
    Healthy,
    Moderate,
    Degraded,
    Critical,
}

impl std::fmt::Display for QueueHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueHealth::Healthy => write!(f, "healthy"),
            QueueHealth::Moderate => write!(f, "moderate"),
            QueueHealth::Degraded => write!(f, "degraded"),
            QueueHealth::Critical => write!(f, "critical"),
        }
    }
}

/// Aggregate queue statistics for a game/mode/region combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub pool_id: String,
    pub game_id: String,
    pub game_mode: String,
    pub region: String,
    pub total_players: u32,
    pub average_wait_time_seconds: f64,
    #[serde(default)]
    pub players_by_tier: BTreeMap<String, u32>,
    pub estimated_match_time_seconds: f64,
    pub queue_health: QueueHealth,
    pub timestamp: DateTime<Utc>,
}

/// Optional filters for a pool stats query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolQuery {
    pub game_id: String,
    pub game_mode: Option<String>,
    pub region: Option<String>,
}

impl PoolQuery {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            ..Default::default()
        }
    }

    pub fn with_game_mode(mut self, game_mode: impl Into<String>) -> Self {
        self.game_mode = Some(game_mode.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}
