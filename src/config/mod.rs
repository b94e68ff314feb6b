//! Configuration management for the replay-matchmaking client
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values.

pub mod api;
pub mod app;
pub mod polling;

// Re-export commonly used types
pub use api::ApiSettings;
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use polling::PollingSettings;
