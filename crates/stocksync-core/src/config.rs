//! Configuration: file + environment, with defaults for every field.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::queue::RetryPolicy;

/// Where the confirm endpoint lives and how to talk to it.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Default: "http://127.0.0.1:8000".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Default: "/api/confirm-products/".
    #[serde(default = "default_confirm_path")]
    pub confirm_path: String,
    /// HTTP client timeout in seconds. Default: 15.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as `X-CSRFToken` when set.
    #[serde(default)]
    pub csrf_token: Option<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}
fn default_confirm_path() -> String {
    "/api/confirm-products/".into()
}
fn default_timeout_secs() -> u64 {
    15
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            confirm_path: default_confirm_path(),
            timeout_secs: default_timeout_secs(),
            csrf_token: None,
        }
    }
}

/// Offline queue settings.
#[derive(Debug, Deserialize, Clone)]
pub struct QueueConfig {
    /// Key the whole queue is stored under. Default: "inventory_offline_orders".
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Directory of the file-backed store. Default: ".stocksync".
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Upper bound for one delivery attempt. Default: 20.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
    /// Drop an order after this many failed attempts. Default: retry forever.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Tries for the end-of-pass rewrite. Default: 3.
    #[serde(default = "default_persist_attempts")]
    pub persist_attempts: u32,
    /// Start empty instead of failing when the stored queue is unreadable.
    #[serde(default)]
    pub discard_corrupt_state: bool,
}

fn default_storage_key() -> String {
    "inventory_offline_orders".into()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from(".stocksync")
}
fn default_attempt_timeout_secs() -> u64 {
    20
}
fn default_persist_attempts() -> u32 {
    3
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            data_dir: default_data_dir(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            max_attempts: None,
            persist_attempts: default_persist_attempts(),
            discard_corrupt_state: false,
        }
    }
}

impl QueueConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self.max_attempts {
            Some(max) => RetryPolicy::with_max_attempts(max),
            None => RetryPolicy::indefinite(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

impl SyncConfig {
    /// Load from `config/stocksync.{toml,json,...}` (or `$STOCKSYNC_CONFIG`)
    /// and `STOCKSYNC__SECTION__FIELD` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("STOCKSYNC_CONFIG").unwrap_or_else(|_| "config/stocksync".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("STOCKSYNC").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
