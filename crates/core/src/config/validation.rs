//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is empty or not an absolute http(s) URL
    /// - `cache_version` is empty or contains whitespace
    /// - `static_assets` is empty or omits `offline_path`
    /// - `api_prefix` does not start with `/`
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `user_agent` is empty
    /// - `sync_interval_secs` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.origin.is_empty() || !self.origin.contains("://") {
            return Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: "must be an absolute http(s) URL".into(),
            });
        }

        if self.cache_version.is_empty() || self.cache_version.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "cache_version".into(),
                reason: "must be a non-empty token without whitespace".into(),
            });
        }

        if self.static_assets.is_empty() {
            return Err(ConfigError::Invalid {
                field: "static_assets".into(),
                reason: "must list at least one asset".into(),
            });
        }
        if !self.static_assets.contains(&self.offline_path) {
            return Err(ConfigError::Invalid {
                field: "static_assets".into(),
                reason: format!("must include the offline document {}", self.offline_path),
            });
        }

        if !self.api_prefix.starts_with('/') {
            return Err(ConfigError::Invalid { field: "api_prefix".into(), reason: "must start with /".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.sync_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sync_interval_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        Ok(())
    }
}
