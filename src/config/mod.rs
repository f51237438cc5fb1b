use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable that points the API client at the backend host.
pub const API_URL_ENV: &str = "SIKATI_API_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend REST API, e.g. `https://api.example.com/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Parse the base URL, normalised to end with a slash so relative
    /// resource paths join underneath it.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("Invalid API base URL: {}", self.base_url))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// JSON file holding persisted sessions (default: <data_dir>/sessions.json)
    pub storage_file: Option<PathBuf>,
    /// Key prefix under which identity and token are persisted
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Name of the browser-session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Persisted sessions untouched for this many days are dropped at
    /// startup. 0 keeps them forever.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_file: None,
            storage_key: default_storage_key(),
            cookie_name: default_cookie_name(),
            max_age_days: default_max_age_days(),
        }
    }
}

impl SessionConfig {
    pub fn max_age(&self) -> Option<Duration> {
        (self.max_age_days > 0).then(|| Duration::from_secs(self.max_age_days * 24 * 60 * 60))
    }
}

fn default_storage_key() -> String {
    "sikati-auth".to_string()
}

fn default_cookie_name() -> String {
    "sikati_session".to_string()
}

fn default_max_age_days() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// Entries older than this are refetched on the next read. Unset means
    /// entries stay fresh until invalidated.
    pub stale_after_secs: Option<u64>,
}

impl CacheConfig {
    pub fn stale_after(&self) -> Option<Duration> {
        self.stale_after_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api.base_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }

    /// Check values that must be resolvable before the server starts.
    pub fn validate(&self) -> Result<()> {
        self.api.parsed_base_url()?;
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than zero");
        }
        if self.session.storage_key.trim().is_empty() {
            anyhow::bail!("session.storage_key must not be empty");
        }
        if self.session.cookie_name.trim().is_empty() {
            anyhow::bail!("session.cookie_name must not be empty");
        }
        Ok(())
    }

    pub fn session_storage_file(&self) -> PathBuf {
        self.session
            .storage_file
            .clone()
            .unwrap_or_else(|| self.server.data_dir.join("sessions.json"))
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
