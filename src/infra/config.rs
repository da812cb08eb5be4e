//! Configuration loading from TOML files
//!
//! Config file is selected via the --config command line argument. A missing
//! or unparseable file falls back to built-in defaults with a warning, so
//! the CLI works out of the box.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// File path for the delivery store (JSON)
    #[serde(default = "default_store_file")]
    pub file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { file: default_store_file() }
    }
}

fn default_store_file() -> String {
    "deliveries.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Connect/read/write timeout applied to every carrier request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Identifying header sent with every carrier request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs(), user_agent: default_user_agent() }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) ParcelTracker/0.1".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Interval between bulk refreshes in watch mode
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_minutes: default_interval_minutes() }
    }
}

fn default_interval_minutes() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Gate for status-transition notifications. Transitions are still
    /// computed and logged when off; the notification events are skipped.
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: default_notifications_enabled() }
    }
}

fn default_notifications_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    store_file: String,
    http_timeout_secs: u64,
    http_user_agent: String,
    refresh_interval_minutes: u64,
    notifications_enabled: bool,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_file: default_store_file(),
            http_timeout_secs: default_timeout_secs(),
            http_user_agent: default_user_agent(),
            refresh_interval_minutes: default_interval_minutes(),
            notifications_enabled: default_notifications_enabled(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            store_file: toml_config.store.file,
            http_timeout_secs: toml_config.http.timeout_secs,
            http_user_agent: toml_config.http.user_agent,
            refresh_interval_minutes: toml_config.refresh.interval_minutes,
            notifications_enabled: toml_config.notifications.enabled,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {e:#}. Using defaults.");
                Self::default()
            }
        }
    }

    pub fn store_file(&self) -> &str {
        &self.store_file
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn http_user_agent(&self) -> &str {
        &self.http_user_agent
    }

    pub fn refresh_interval_minutes(&self) -> u64 {
        self.refresh_interval_minutes
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes * 60)
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }
}
