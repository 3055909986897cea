use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::config::types::Config;

/// Environment variables holding the service endpoint, in lookup order.
pub const URL_VARS: [&str; 2] = ["SUPABASE_URL", "VITE_SUPABASE_URL"];
/// Environment variables holding the anon key, in lookup order.
pub const KEY_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"];

/// Errors that can occur when loading configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{what} is required: set {var} or [supabase] in the config file")]
    MissingCredential { what: &'static str, var: &'static str },

    #[error("Invalid Supabase URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/supatodo/config.toml` on Unix, or the platform
    /// equivalent via `dirs::config_dir()`.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("supatodo").join("config.toml")
    }

    /// Loads the config file (if any), applies process environment overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        Self::load_with_env(&path, |name| std::env::var(name).ok())
    }

    /// Like [`Config::load`] with an injectable environment lookup.
    ///
    /// A missing file is not an error: credentials may come from the environment alone.
    pub fn load_with_env<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };
        config.apply_env(env);
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without environment overrides or validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Environment values win over file values; empty variables count as unset.
    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| env(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };
        if let Some(url) = lookup(&URL_VARS) {
            self.supabase.url = url;
        }
        if let Some(key) = lookup(&KEY_VARS) {
            self.supabase.anon_key = key;
        }
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - endpoint and key are present
    /// - the endpoint is an absolute http(s) URL
    /// - table, channel and heartbeat are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supabase.url.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                what: "Supabase URL",
                var: URL_VARS[0],
            });
        }
        if self.supabase.anon_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                what: "Supabase anon key",
                var: KEY_VARS[0],
            });
        }
        self.service_url()?;

        if self.table.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "table.name must not be empty".to_string(),
            });
        }
        if self.table.schema.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "table.schema must not be empty".to_string(),
            });
        }
        if self.realtime.enabled {
            if self.realtime.channel.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "realtime.channel must not be empty".to_string(),
                });
            }
            if self.realtime.heartbeat_seconds == 0 {
                return Err(ConfigError::ValidationError {
                    message: "realtime.heartbeat_seconds must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Parsed service endpoint.
    pub fn service_url(&self) -> Result<Url, ConfigError> {
        let raw = self.supabase.url.trim();
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl {
                value: raw.to_string(),
                reason: "URL must start with https:// (or http://) and name a host".to_string(),
            });
        }
        Ok(url)
    }

    /// Websocket endpoint of the change feed, derived from the service URL.
    pub fn realtime_url(&self) -> Result<Url, ConfigError> {
        let mut url = self.service_url()?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| ConfigError::InvalidUrl {
                value: self.supabase.url.clone(),
                reason: format!("cannot derive {scheme} endpoint"),
            })?;
        url.set_path("/realtime/v1/websocket");
        url.query_pairs_mut()
            .clear()
            .append_pair("apikey", &self.supabase.anon_key)
            .append_pair("vsn", "1.0.0");
        Ok(url)
    }
}
