//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (VIGIL_*)
//! 2. TOML config file (if VIGIL_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (VIGIL_*)
/// 2. TOML config file (if VIGIL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the origin server this agent fronts.
    ///
    /// Set via VIGIL_ORIGIN environment variable. Requests to any other
    /// origin are never intercepted.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Cache version token embedded in partition names.
    ///
    /// Set via VIGIL_CACHE_VERSION environment variable. Bumping this token
    /// is the only supported way to invalidate all caches at once.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Asset manifest seeded into the static partition at install.
    ///
    /// Set via VIGIL_STATIC_ASSETS environment variable. Every entry must
    /// return 2xx during install or the install fails as a whole.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// Path of the reserved offline fallback document.
    ///
    /// Set via VIGIL_OFFLINE_PATH environment variable. Must appear in
    /// `static_assets`.
    #[serde(default = "default_offline_path")]
    pub offline_path: String,

    /// Path prefix of the origin's API namespace.
    ///
    /// Set via VIGIL_API_PREFIX environment variable. Requests under this
    /// prefix receive a structured 503 body when the network is down.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Path to the SQLite cache-partition database.
    ///
    /// Set via VIGIL_CACHE_DB_PATH environment variable.
    #[serde(default = "default_cache_db_path")]
    pub cache_db_path: PathBuf,

    /// Path to the SQLite outbox database.
    ///
    /// Set via VIGIL_OUTBOX_DB_PATH environment variable.
    #[serde(default = "default_outbox_db_path")]
    pub outbox_db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via VIGIL_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via VIGIL_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to accept per response body.
    ///
    /// Set via VIGIL_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Seconds between periodic sync-trigger ticks in the agent binary.
    ///
    /// Set via VIGIL_SYNC_INTERVAL_SECS environment variable.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
}

fn default_origin() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_cache_version() -> String {
    "v1".into()
}

fn default_static_assets() -> Vec<String> {
    vec![
        "/".into(),
        "/manifest.json".into(),
        "/offline.html".into(),
        "/icons/icon-192.png".into(),
        "/icons/icon-512.png".into(),
    ]
}

fn default_offline_path() -> String {
    "/offline.html".into()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_cache_db_path() -> PathBuf {
    PathBuf::from("./vigil-cache.sqlite")
}

fn default_outbox_db_path() -> PathBuf {
    PathBuf::from("./vigil-outbox.sqlite")
}

fn default_user_agent() -> String {
    "vigil/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_sync_interval_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_version: default_cache_version(),
            static_assets: default_static_assets(),
            offline_path: default_offline_path(),
            api_prefix: default_api_prefix(),
            cache_db_path: default_cache_db_path(),
            outbox_db_path: default_outbox_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            sync_interval_secs: default_sync_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Sync tick interval as Duration.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Name of the static partition for the configured version.
    pub fn static_partition(&self) -> String {
        crate::cache::static_partition(&self.cache_version)
    }

    /// Name of the dynamic partition for the configured version.
    pub fn dynamic_partition(&self) -> String {
        crate::cache::dynamic_partition(&self.cache_version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `VIGIL_`
    /// 2. TOML file from `VIGIL_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("VIGIL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("VIGIL_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cache_version, "v1");
        assert_eq!(config.offline_path, "/offline.html");
        assert_eq!(config.api_prefix, "/api/");
        assert_eq!(config.cache_db_path, PathBuf::from("./vigil-cache.sqlite"));
        assert_eq!(config.outbox_db_path, PathBuf::from("./vigil-outbox.sqlite"));
        assert_eq!(config.user_agent, "vigil/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.sync_interval_secs, 300);
        assert!(config.static_assets.contains(&config.offline_path));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.sync_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_partition_names_embed_version() {
        let config = AppConfig { cache_version: "v7".into(), ..Default::default() };
        assert_eq!(config.static_partition(), "static-v7");
        assert_eq!(config.dynamic_partition(), "dynamic-v7");
    }
}
