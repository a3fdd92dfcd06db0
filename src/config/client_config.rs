//! Client Configuration - service address, pacing and dashboard settings
//!
//! Each struct implements `Default` with the values from [`super::defaults`],
//! so a missing file or a partial file behaves like the built-in setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults::{
    CONFIG_ENV_VAR, DEFAULT_DASHBOARD_ADDR, DEFAULT_EVENT_BUFFER, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_PACING_MS, DEFAULT_SERVICE_URL, FEATURE_IMPORTANCE_ASSET_PATH, LOCAL_CONFIG_FILE,
};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `ClientConfig::load()` which searches:
/// 1. `$FAILSTREAM_CONFIG` env var
/// 2. `./failstream.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Remote prediction service
    #[serde(default)]
    pub service: ServiceConfig,

    /// Stream pacing
    #[serde(default)]
    pub stream: StreamConfig,

    /// Local dashboard API
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl ClientConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults when no file is found or a file fails to load.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), service = %config.service.base_url, "Loaded config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./failstream.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(service = %config.service.base_url, "Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let url = &self.service.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!(
                "service.base_url must start with http:// or https:// (got '{url}')"
            ));
        }
        if self.service.timeout_secs == 0 {
            errors.push("service.timeout_secs must be greater than 0".to_string());
        }
        if self.dashboard.event_buffer == 0 {
            errors.push("dashboard.event_buffer must be greater than 0".to_string());
        }
        if self.dashboard.bind_addr.trim().is_empty() {
            errors.push("dashboard.bind_addr must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Full URL of the feature importance chart served by the service.
    pub fn asset_url(&self) -> String {
        format!(
            "{}{}",
            self.service.base_url.trim_end_matches('/'),
            self.dashboard.asset_path
        )
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Service
// ============================================================================

/// Remote prediction service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base address, e.g. `http://127.0.0.1:8000`
    #[serde(default = "default_service_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ============================================================================
// Stream
// ============================================================================

/// Stream pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Delay between consecutive submissions (ms). 0 disables pacing.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

fn default_pacing_ms() -> u64 {
    DEFAULT_PACING_MS
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
        }
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Dashboard API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Broadcast capacity for stream events
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Path of the importance chart on the service
    #[serde(default = "default_asset_path")]
    pub asset_path: String,
}

fn default_bind_addr() -> String {
    DEFAULT_DASHBOARD_ADDR.to_string()
}
fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}
fn default_asset_path() -> String {
    FEATURE_IMPORTANCE_ASSET_PATH.to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            event_buffer: default_event_buffer(),
            asset_path: default_asset_path(),
        }
    }
}
