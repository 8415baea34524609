//! Server configuration.
//!
//! This module provides configuration management for the SqlScope parse
//! service. Every field has a default, so a config file only needs the
//! values it changes.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlscope_common::{
    DEFAULT_ALLOW_ORIGIN, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_READ_TIMEOUT_MS,
    MAX_REQUEST_BODY_SIZE, PARSE_SQL_PATH,
};

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path that accepts parse requests.
    #[serde(default = "default_parse_path")]
    pub parse_path: String,

    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Milliseconds a client may take to send its request.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Indent JSON responses.
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,

    /// Value of `Access-Control-Allow-Origin`.
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_parse_path() -> String {
    PARSE_SQL_PATH.to_string()
}

fn default_max_body_bytes() -> usize {
    MAX_REQUEST_BODY_SIZE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_pretty_json() -> bool {
    true
}

fn default_allow_origin() -> String {
    DEFAULT_ALLOW_ORIGIN.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            parse_path: default_parse_path(),
            max_body_bytes: default_max_body_bytes(),
            read_timeout_ms: default_read_timeout_ms(),
            pretty_json: default_pretty_json(),
            allow_origin: default_allow_origin(),
        }
    }
}

impl ServerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Converts configuration to TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the request read deadline.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Creates a builder for configuration.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }
}

/// Builder for server configuration.
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the parse endpoint path.
    pub fn parse_path(mut self, path: impl Into<String>) -> Self {
        self.config.parse_path = path.into();
        self
    }

    /// Sets the request body limit.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.config.max_body_bytes = limit;
        self
    }

    /// Sets the request read deadline in milliseconds.
    pub fn read_timeout_ms(mut self, millis: u64) -> Self {
        self.config.read_timeout_ms = millis;
        self
    }

    /// Enables or disables indented JSON responses.
    pub fn pretty_json(mut self, enabled: bool) -> Self {
        self.config.pretty_json = enabled;
        self
    }

    /// Sets the allowed CORS origin.
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.allow_origin = origin.into();
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ServerConfig {
        self.config
    }
}
