//! Global configuration parsing, environment overrides, and validation.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8000
}

fn default_server_name() -> String {
    "Simple Example Server".into()
}

fn default_keep_alive_seconds() -> u64 {
    15
}

/// Global configuration parsed from an optional `config.toml` and the
/// process environment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Bind address for the HTTP/SSE listener; defaults to all interfaces.
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port for the HTTP/SSE listener.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Display name reported in the handshake and the metadata endpoint.
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Shared secret gating the stream transport. `None` disables auth.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Interval between SSE keep-alive comments.
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            server_name: default_server_name(),
            api_key: None,
            keep_alive_seconds: default_keep_alive_seconds(),
        }
    }
}

impl GlobalConfig {
    /// Build the effective configuration: defaults, then the optional TOML
    /// file, then `PORT` / `HOST` / `SERVER_NAME` / `API_KEY` overrides.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or parsed, an
    /// environment value is malformed, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides_with(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Unset variables leave the current value untouched. An empty
    /// `API_KEY` disables authentication.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` is not a valid port number.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|err| AppError::Config(format!("invalid PORT '{port}': {err}")))?;
        }
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(name) = lookup("SERVER_NAME") {
            self.server_name = name;
        }
        if let Some(key) = lookup("API_KEY") {
            self.api_key = Some(key);
        }
        self.normalize();
        Ok(())
    }

    /// `host:port` string suitable for binding a listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Whether the stream transport requires a shared secret.
    #[must_use]
    pub fn auth_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn normalize(&mut self) {
        if self.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            self.api_key = None;
        }
        self.host = self.host.trim().to_owned();
        self.server_name = self.server_name.trim().to_owned();
    }

    fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(AppError::Config("host must not be empty".into()));
        }

        if self.server_name.is_empty() {
            return Err(AppError::Config("server_name must not be empty".into()));
        }

        if self.keep_alive_seconds == 0 {
            return Err(AppError::Config(
                "keep_alive_seconds must be greater than zero".into(),
            ));
        }

        if self.port == 0 {
            warn!("port is 0; the OS will assign an ephemeral port");
        }

        Ok(())
    }
}
