//! Runtime configuration from the environment (after `.env` is loaded).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/ecommerce";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub body_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Config {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            bind_addr: parse(get("BIND_ADDR"), "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?,
            max_connections: parse(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", Some(DEFAULT_MAX_CONNECTIONS))?,
            body_limit: parse(get("BODY_LIMIT_BYTES"), "BODY_LIMIT_BYTES", Some(DEFAULT_BODY_LIMIT))?,
        })
    }
}

fn parse<T: FromStr>(raw: Option<String>, key: &'static str, default: Option<T>) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => default.ok_or(ConfigError::Invalid {
            key,
            value: String::new(),
        }),
    }
}
