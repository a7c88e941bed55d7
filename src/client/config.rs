//! # Client Configuration
//!
//! Configuration surface for the sync agent: the server URL (absent means
//! offline-only), the local data file, request timeouts, and the
//! reconnect backoff bounds.
//!
//! Sources, in increasing precedence:
//! 1. built-in defaults
//! 2. a TOML config file (`CHORESYNC_CONFIG`, or
//!    `<config dir>/choresync/config.toml`)
//! 3. the `CHORESYNC_SERVER_URL` environment variable

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::client::backoff::Backoff;
use crate::client::local::LocalStore;
use crate::shared::config::{AppConfig, ConfigError};

/// Default bound on fetch/push round-trips and the subscribe handshake
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on TCP connection establishment
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sync agent configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    app: AppConfig,
    data_path: Option<PathBuf>,
    request_timeout: Duration,
    connect_timeout: Duration,
    backoff_base: Duration,
    backoff_max: Duration,
}

/// On-disk shape of the config file
#[derive(Debug, Default, Deserialize)]
struct ClientConfigFile {
    server_url: Option<String>,
    data_path: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            data_path: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            backoff_base: crate::client::backoff::DEFAULT_BASE_DELAY,
            backoff_max: crate::client::backoff::DEFAULT_MAX_DELAY,
        }
    }
}

impl ClientConfig {
    /// Offline-only configuration (no server)
    pub fn offline() -> Self {
        Self::default()
    }

    /// Configuration for a specific server URL
    pub fn with_server_url(url: impl Into<String>) -> Result<Self, ConfigError> {
        let app = AppConfig::builder().server_url(url.into()).build()?;
        Ok(Self { app, ..Self::default() })
    }

    /// Load configuration from the config file and environment.
    ///
    /// Failures are logged and degrade to defaults; configuration can
    /// never prevent the agent from running in offline mode.
    pub fn load() -> Self {
        let mut config = match Self::config_file_path() {
            Some(path) if path.is_file() => match std::fs::read_to_string(&path) {
                Ok(raw) => match Self::from_toml_str(&raw) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("[Config] Ignoring {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("[Config] Could not read {}: {}", path.display(), e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var("CHORESYNC_SERVER_URL") {
            match AppConfig::builder().server_url(url.clone()).build() {
                Ok(app) => config.app = app,
                Err(e) => {
                    tracing::warn!("[Config] Ignoring CHORESYNC_SERVER_URL={}: {}", url, e)
                }
            }
        }

        config
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: ClientConfigFile =
            toml::from_str(raw).map_err(|e| ConfigError::Unreadable(e.to_string()))?;

        let app = match file.server_url {
            Some(url) => AppConfig::builder().server_url(url).build()?,
            None => AppConfig::default(),
        };

        let defaults = Self::default();
        Ok(Self {
            app,
            data_path: file.data_path,
            request_timeout: file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            connect_timeout: file
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            ..defaults
        })
    }

    fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("CHORESYNC_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("choresync").join("config.toml"))
    }

    /// Configured server URL, if any
    pub fn server_url(&self) -> Option<&str> {
        self.app.server_url.as_deref()
    }

    /// Path of the local data file
    pub fn data_path(&self) -> PathBuf {
        self.data_path.clone().unwrap_or_else(LocalStore::default_path)
    }

    /// Bound on fetch/push round-trips
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Bound on TCP connection establishment
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Fresh backoff state with the configured bounds
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.backoff_base, self.backoff_max)
    }

    /// Override the local data file location
    pub fn set_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Override the request timeout
    pub fn set_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the backoff bounds
    pub fn set_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_max = max;
        self
    }
}
