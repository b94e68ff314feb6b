//! Error types for the matchmaking client
//!
//! Every transport and SDK call returns [`MatchmakingError`] so callers can
//! tell apart failures that came from the backend, from the network, and
//! from their own input.

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MatchmakingError>;

/// Errors surfaced by the matchmaking client
#[derive(Debug, thiserror::Error)]
pub enum MatchmakingError {
    #[error("Failed to join queue ({status}): {message}")]
    QueueJoin { status: u16, message: String },

    #[error("Failed to leave queue ({status}): {message}")]
    QueueLeave { status: u16, message: String },

    #[error("Failed to fetch session status ({status}): {message}")]
    StatusFetch { status: u16, message: String },

    #[error("Failed to fetch pool stats ({status}): {message}")]
    PoolStatsFetch { status: u16, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Invalid request: {reason}")]
    Validation { reason: String },

    #[error("Gave up polling session {session_id} after {retries} consecutive failures")]
    MaxRetriesExceeded { session_id: String, retries: u32 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl MatchmakingError {
    /// Build a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// True for network failures and non-success HTTP responses
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::QueueJoin { .. }
                | Self::QueueLeave { .. }
                | Self::StatusFetch { .. }
                | Self::PoolStatsFetch { .. }
                | Self::Transport { .. }
        )
    }

    /// HTTP status code attached to the error, if the backend answered
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::QueueJoin { status, .. }
            | Self::QueueLeave { status, .. }
            | Self::StatusFetch { status, .. }
            | Self::PoolStatsFetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MatchmakingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else if err.is_timeout() {
            Self::Transport {
                message: format!("request timed out: {}", err),
            }
        } else {
            Self::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for MatchmakingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}
