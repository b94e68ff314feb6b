//! URL construction for matchmaking endpoints

use crate::error::{MatchmakingError, Result};
use crate::types::PoolQuery;
use reqwest::Url;

/// Builds endpoint URLs relative to the backend base URL
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    base: Url,
}

impl RouteBuilder {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| MatchmakingError::Configuration {
            message: format!("invalid base URL {}: {}", base_url, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(MatchmakingError::Configuration {
                message: format!("base URL {} cannot carry a path", base_url),
            });
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `POST /matchmaking/queue`
    pub fn join_queue(&self) -> Url {
        self.endpoint(&["matchmaking", "queue"])
    }

    /// `DELETE /matchmaking/queue/{session_id}`
    pub fn leave_queue(&self, session_id: &str) -> Url {
        self.endpoint(&["matchmaking", "queue", session_id])
    }

    /// `GET /matchmaking/session/{session_id}`
    pub fn session_status(&self, session_id: &str) -> Url {
        self.endpoint(&["matchmaking", "session", session_id])
    }

    /// `GET /matchmaking/pools/{game_id}?game_mode=&region=`
    pub fn pool_stats(&self, query: &PoolQuery) -> Url {
        let mut url = self.endpoint(&["matchmaking", "pools", &query.game_id]);
        let filters: Vec<(&str, &str)> = [
            ("game_mode", query.game_mode.as_deref()),
            ("region", query.region.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

        // query_pairs_mut() would leave a bare '?' behind
        if !filters.is_empty() {
            url.query_pairs_mut().extend_pairs(filters);
        }
        url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
