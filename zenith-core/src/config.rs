//! Application configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `ZENITH_*` environment variables.

use crate::ConfigError;
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "zenith.toml";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_REDDIT_BASE_URL: &str = "https://www.reddit.com";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP API listens on, `<ip>:<port>`.
    pub bind_address: String,
    /// sqlx connection string for the monitor store.
    pub database_url: String,
    /// Origin of the public search endpoint. Permalinks are made absolute against it.
    pub reddit_base_url: String,
    pub user_agent: String,
    /// Outbound request timeout. `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
    /// tracing-subscriber filter directive; `RUST_LOG` still wins when set.
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            database_url: "sqlite://zenith.db".to_string(),
            reddit_base_url: DEFAULT_REDDIT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Load from `ZENITH_CONFIG` (must exist) or `./zenith.toml` (optional), then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var("ZENITH_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ZENITH_BIND_ADDRESS") {
            self.bind_address = value;
        }
        if let Some(value) = lookup("ZENITH_DATABASE_URL") {
            self.database_url = value;
        }
        if let Some(value) = lookup("ZENITH_REDDIT_BASE_URL") {
            self.reddit_base_url = value;
        }
        if let Some(value) = lookup("ZENITH_USER_AGENT") {
            self.user_agent = value;
        }
        if let Some(value) = lookup("ZENITH_REQUEST_TIMEOUT_SECS") {
            let seconds = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    field: "request_timeout_secs".to_string(),
                    value: value.clone(),
                })?;
            self.request_timeout_secs = Some(seconds);
        }
        if let Some(value) = lookup("ZENITH_LOG_FILTER") {
            self.log_filter = Some(value);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.database_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database_url".to_string(),
                value: self.database_url.clone(),
            });
        }

        let base = Url::parse(&self.reddit_base_url).map_err(|_| ConfigError::InvalidValue {
            field: "reddit_base_url".to_string(),
            value: self.reddit_base_url.clone(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "reddit_base_url".to_string(),
                value: self.reddit_base_url.clone(),
            });
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "bind_address".to_string(),
                value: self.bind_address.clone(),
            })
    }
}
