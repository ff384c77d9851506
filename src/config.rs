//! Configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    pub database_max_connections: u32,
    /// Comma-separated Kafka bootstrap servers.
    pub kafka_brokers: String,
    /// Topic the intake worker consumes. Dead letters go to `<queue>.dlq`.
    pub received_queue: String,
    pub consumer_group: String,
    pub max_concurrent_calls: usize,
    /// Port for /metrics, /health and /events/nearby.
    pub http_port: u16,
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first
    /// when present.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DATABASE_URL` | Postgres connection string | (required) |
    /// | `DATABASE_MAX_CONNECTIONS` | Pool size | `10` |
    /// | `KAFKA_BROKERS` | Bootstrap servers | `127.0.0.1:9092` |
    /// | `RECEIVED_QUEUE` | Intake topic | `events-received` |
    /// | `CONSUMER_GROUP` | Kafka consumer group | `tourney-intake` |
    /// | `MAX_CONCURRENT_CALLS` | In-flight message bound | `5` |
    /// | `HTTP_PORT` | HTTP server port | `9090` |
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let kafka_brokers = lookup("KAFKA_BROKERS").unwrap_or_else(|| "127.0.0.1:9092".to_string());
        let received_queue = lookup("RECEIVED_QUEUE").unwrap_or_else(|| "events-received".to_string());
        let consumer_group = lookup("CONSUMER_GROUP").unwrap_or_else(|| "tourney-intake".to_string());

        let max_concurrent_calls: usize = parse_or(&lookup, "MAX_CONCURRENT_CALLS", 5)?;
        if max_concurrent_calls == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_CONCURRENT_CALLS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            kafka_brokers,
            received_queue,
            consumer_group,
            max_concurrent_calls,
            http_port: parse_or(&lookup, "HTTP_PORT", 9090)?,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/tourneys")]).unwrap();

        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.kafka_brokers, "127.0.0.1:9092");
        assert_eq!(config.received_queue, "events-received");
        assert_eq!(config.consumer_group, "tourney-intake");
        assert_eq!(config.max_concurrent_calls, 5);
        assert_eq!(config.http_port, 9090);
    }

    #[test]
    fn test_database_url_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/tourneys"),
            ("MAX_CONCURRENT_CALLS", "12"),
            ("HTTP_PORT", " 8081 "),
            ("RECEIVED_QUEUE", "intake"),
        ])
        .unwrap();

        assert_eq!(config.max_concurrent_calls, 12);
        assert_eq!(config.http_port, 8081);
        assert_eq!(config.received_queue, "intake");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = load(&[("DATABASE_URL", "postgres://db"), ("HTTP_PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HTTP_PORT", .. }));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let err = load(&[("DATABASE_URL", "postgres://db"), ("MAX_CONCURRENT_CALLS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MAX_CONCURRENT_CALLS", .. }));
    }
}
