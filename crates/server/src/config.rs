//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORDERS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ORDERS_HOST` - Bind address (default: 127.0.0.1)
//! - `ORDERS_PORT` - Listen port (default: 3000)
//! - `ORDERS_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `ORDERS_LISTING_CACHE_TTL_SECS` - Listing cache lifetime (default: 60, at most 86400)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Longest accepted listing cache lifetime (one day).
const MAX_LISTING_CACHE_TTL_SECS: u64 = 86_400;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Maximum number of pooled database connections
    pub db_max_connections: u32,
    /// How long a cached listing may be served before it is re-read
    pub listing_cache_ttl: Duration,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when unset
    pub dsn: Option<String>,
    /// Environment tag (e.g. `production`)
    pub environment: Option<String>,
    /// Fraction of error events sent
    pub sample_rate: f32,
    /// Fraction of transactions traced
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("ORDERS_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("ORDERS_DATABASE_URL".to_string()))?;

        let host = parse_or_default(&lookup, "ORDERS_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or_default(&lookup, "ORDERS_PORT", 3000_u16)?;
        let db_max_connections = parse_or_default(&lookup, "ORDERS_DB_MAX_CONNECTIONS", 10_u32)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ORDERS_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let ttl_secs = parse_or_default(&lookup, "ORDERS_LISTING_CACHE_TTL_SECS", 60_u64)?;
        if ttl_secs > MAX_LISTING_CACHE_TTL_SECS {
            return Err(ConfigError::InvalidEnvVar(
                "ORDERS_LISTING_CACHE_TTL_SECS".to_string(),
                format!("must be at most {MAX_LISTING_CACHE_TTL_SECS}"),
            ));
        }

        let sentry = SentryConfig {
            dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            environment: lookup("SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate(&lookup, "SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: parse_rate(&lookup, "SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            listing_cache_ttl: Duration::from_secs(ttl_secs),
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a sample rate in `0.0..=1.0`.
fn parse_rate<F>(lookup: &F, key: &str, default: f32) -> Result<f32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let rate = parse_or_default(lookup, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ORDERS_DATABASE_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("ORDERS_DATABASE_URL", "postgres://localhost/orders")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.listing_cache_ttl, Duration::from_secs(60));
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fly/orders")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/orders");
    }

    #[test]
    fn test_primary_database_url_wins() {
        let config = load(&[
            ("ORDERS_DATABASE_URL", "postgres://primary/orders"),
            ("DATABASE_URL", "postgres://fallback/orders"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://primary/orders");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ORDERS_DATABASE_URL", "postgres://localhost/orders"),
            ("ORDERS_HOST", "0.0.0.0"),
            ("ORDERS_PORT", "8080"),
            ("ORDERS_LISTING_CACHE_TTL_SECS", "5"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.listing_cache_ttl, Duration::from_secs(5));
        assert!(config.sentry.dsn.is_some());
        assert!((config.sentry.traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("ORDERS_DATABASE_URL", "postgres://localhost/orders"),
            ("ORDERS_PORT", "not-a-port"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ORDERS_PORT"));
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let err = load(&[
            ("ORDERS_DATABASE_URL", "postgres://localhost/orders"),
            ("ORDERS_DB_MAX_CONNECTIONS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_listing_cache_ttl_upper_bound() {
        let err = load(&[
            ("ORDERS_DATABASE_URL", "postgres://localhost/orders"),
            ("ORDERS_LISTING_CACHE_TTL_SECS", "99999999999"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ORDERS_LISTING_CACHE_TTL_SECS")
        );

        let config = load(&[
            ("ORDERS_DATABASE_URL", "postgres://localhost/orders"),
            ("ORDERS_LISTING_CACHE_TTL_SECS", "86400"),
        ])
        .unwrap();
        assert_eq!(config.listing_cache_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_sample_rate_out_of_range() {
        let err = load(&[
            ("ORDERS_DATABASE_URL", "postgres://localhost/orders"),
            ("SENTRY_SAMPLE_RATE", "1.5"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SENTRY_SAMPLE_RATE"));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("ORDERS_DATABASE_URL", "postgres://user:hunter2@db/orders")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
