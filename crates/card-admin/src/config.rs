//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Card admin server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CARDS_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:cards.db?mode=rwc` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("CARDS_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            lookup("SQLITE_PATH").unwrap_or_else(|| "sqlite:cards.db?mode=rwc".to_string());

        Ok(Self { addr, database_url })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CARDS_ADDR format")]
    InvalidAddr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8790");
        assert_eq!(config.database_url, "sqlite:cards.db?mode=rwc");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(|key| match key {
            "CARDS_ADDR" => Some("0.0.0.0:9000".to_string()),
            "SQLITE_PATH" => Some("sqlite::memory:".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_invalid_addr() {
        let result = Config::from_lookup(|key| (key == "CARDS_ADDR").then(|| "nope".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidAddr)));
    }
}
