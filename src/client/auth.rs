//! Bearer token sources for outbound requests
//!
//! Tokens are handed to the client explicitly; there is no process-wide
//! token manager.

use std::sync::RwLock;

/// Supplies the bearer token attached to each request
pub trait TokenProvider: Send + Sync {
    /// Current token, or `None` to send the request unauthenticated
    fn bearer_token(&self) -> Option<String>;
}

/// Sends every request without an `Authorization` header
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuth;

impl TokenProvider for NoAuth {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Holds a token that can be replaced when the caller refreshes it
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Replace the stored token
    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut current) = self.token.write() {
            *current = Some(token.into());
        }
    }

    /// Forget the stored token
    pub fn clear(&self) {
        if let Ok(mut current) = self.token.write() {
            *current = None;
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|token| token.clone())
    }
}
