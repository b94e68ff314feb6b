//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! replay-matchmaking client, including environment variable loading,
//! TOML file loading and validation.

use crate::config::api::ApiSettings;
use crate::config::polling::PollingSettings;
use crate::polling::PollOptions;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub api: ApiSettings,
    pub polling: PollingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in logs and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "replay-matchmaking".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text without validating it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse TOML configuration")
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // API settings
        if let Ok(url) = env::var("REPLAY_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = env::var("REPLAY_API_TIMEOUT_MS") {
            self.api.request_timeout_ms = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid REPLAY_API_TIMEOUT_MS value: {}", timeout))?;
        }
        if let Ok(token) = env::var("REPLAY_API_TOKEN") {
            self.api.auth_token = Some(token).filter(|t| !t.is_empty());
        }

        // Polling settings
        if let Ok(initial) = env::var("POLL_INITIAL_INTERVAL_MS") {
            self.polling.initial_interval_ms = initial
                .parse()
                .map_err(|_| anyhow!("Invalid POLL_INITIAL_INTERVAL_MS value: {}", initial))?;
        }
        if let Ok(max) = env::var("POLL_MAX_INTERVAL_MS") {
            self.polling.max_interval_ms = max
                .parse()
                .map_err(|_| anyhow!("Invalid POLL_MAX_INTERVAL_MS value: {}", max))?;
        }
        if let Ok(retries) = env::var("POLL_MAX_RETRIES") {
            self.polling.max_retries = retries
                .parse()
                .map_err(|_| anyhow!("Invalid POLL_MAX_RETRIES value: {}", retries))?;
        }
        if let Ok(refresh) = env::var("POOL_REFRESH_INTERVAL_MS") {
            self.polling.pool_refresh_interval_ms = refresh
                .parse()
                .map_err(|_| anyhow!("Invalid POOL_REFRESH_INTERVAL_MS value: {}", refresh))?;
        }

        Ok(())
    }

    /// Get the per-request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.api.request_timeout_ms)
    }

    /// Get the pool refresh period as Duration
    pub fn pool_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.polling.pool_refresh_interval_ms)
    }

    /// Build session polling options from the polling settings
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            initial_interval: Duration::from_millis(self.polling.initial_interval_ms),
            max_interval: Duration::from_millis(self.polling.max_interval_ms),
            max_retries: self.polling.max_retries,
        }
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate API settings
    if config.api.base_url.is_empty() {
        return Err(anyhow!("API base URL cannot be empty"));
    }
    reqwest::Url::parse(&config.api.base_url)
        .map_err(|e| anyhow!("Invalid API base URL {}: {}", config.api.base_url, e))?;
    if config.api.request_timeout_ms == 0 {
        return Err(anyhow!("Request timeout must be greater than 0"));
    }

    // Validate polling settings
    if config.polling.initial_interval_ms == 0 {
        return Err(anyhow!("Initial poll interval must be greater than 0"));
    }
    if config.polling.max_interval_ms < config.polling.initial_interval_ms {
        return Err(anyhow!(
            "Max poll interval ({}ms) must not be below the initial interval ({}ms)",
            config.polling.max_interval_ms,
            config.polling.initial_interval_ms
        ));
    }
    if config.polling.max_retries == 0 {
        return Err(anyhow!("Max retries must be at least 1"));
    }
    if config.polling.pool_refresh_interval_ms == 0 {
        return Err(anyhow!("Pool refresh interval must be greater than 0"));
    }

    Ok(())
}
