use std::{env, net::SocketAddr};

use clap::ValueEnum;

use crate::routing::Metric;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR '{value}': {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid DISTANCE_METRIC: {0}")]
    Metric(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub metric: Metric,
}

impl ServerConfig {
    /// Read `BIND_ADDR` and `DISTANCE_METRIC`, falling back to defaults when
    /// unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_value = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .parse()
            .map_err(|source| ConfigError::BindAddr {
                value: bind_value.clone(),
                source,
            })?;

        let metric = match lookup("DISTANCE_METRIC") {
            Some(value) => Metric::from_str(&value, true).map_err(ConfigError::Metric)?,
            None => Metric::default(),
        };

        Ok(Self { bind_addr, metric })
    }
}
