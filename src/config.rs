//! Connection configuration

use crate::client::Precision;
use crate::error::{Error, Result};
use tracing::info;

/// How to reach the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, typically `http://localhost:8086`
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Precision of timestamps sent on write
    pub precision: Precision,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            username: None,
            password: None,
            precision: Precision::Nanoseconds,
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Create configuration from environment
    ///
    /// Environment variables:
    /// - INFLUX_URL: server URL (default: http://localhost:8086)
    /// - INFLUX_USERNAME: user name (optional)
    /// - INFLUX_PASSWORD: password (optional)
    /// - INFLUX_PRECISION: ns (default), u, ms, s, m or h
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("INFLUX_URL") {
            config.url = url;
        }
        config.username = lookup("INFLUX_USERNAME").filter(|u| !u.is_empty());
        config.password = lookup("INFLUX_PASSWORD");
        if let Some(precision) = lookup("INFLUX_PRECISION") {
            config.precision = precision.parse().map_err(Error::Configuration)?;
        }

        info!(
            "Using InfluxDB at {} (precision {})",
            config.url, config.precision
        );
        Ok(config)
    }
}
