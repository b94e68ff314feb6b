//! Backend API settings

use serde::{Deserialize, Serialize};

/// Connection settings for the replay-api backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the backend, e.g. `http://localhost:4991`
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Bearer token attached to every request
    pub auth_token: Option<String>,
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4991".to_string(),
            request_timeout_ms: 10_000,
            auth_token: None,
            user_agent: format!("replay-matchmaking/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
