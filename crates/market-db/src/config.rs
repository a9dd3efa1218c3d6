//! # Store Configuration
//!
//! Connection settings for the PostgreSQL pool.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults:
//!
//! | Variable                   | Default     |
//! |----------------------------|-------------|
//! | `POSTGRES_HOST`            | `localhost` |
//! | `POSTGRES_USER`            | `postgres`  |
//! | `POSTGRES_DATABASE`        | `market`    |
//! | `POSTGRES_PASSWORD`        | *(empty)*   |
//! | `POSTGRES_PORT`            | `5432`      |
//! | `POSTGRES_MAX_CONNECTIONS` | `10`        |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

/// Database configuration.
///
/// ## Example
/// ```rust
/// use market_db::StoreConfig;
///
/// let config = StoreConfig::new("db.internal", "market")
///     .user("inventory")
///     .max_connections(20);
/// assert_eq!(config.port, 5432);
/// ```
#[derive(Clone)]
pub struct StoreConfig {
    pub host: String,
    pub user: String,
    pub database: String,
    pub password: String,
    pub port: u16,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Connections kept open while idle.
    pub min_connections: u32,

    /// How long an operation waits for a free connection.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            host: "localhost".to_string(),
            user: "postgres".to_string(),
            database: "market".to_string(),
            password: String::new(),
            port: 5432,
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for `database` on `host` with default settings.
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        StoreConfig {
            host: host.into(),
            database: database.into(),
            ..StoreConfig::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();

        Ok(StoreConfig {
            host: lookup("POSTGRES_HOST").unwrap_or(defaults.host),
            user: lookup("POSTGRES_USER").unwrap_or(defaults.user),
            database: lookup("POSTGRES_DATABASE").unwrap_or(defaults.database),
            password: lookup("POSTGRES_PASSWORD").unwrap_or(defaults.password),
            port: parse_or(&lookup, "POSTGRES_PORT", defaults.port)?,
            max_connections: parse_or(&lookup, "POSTGRES_MAX_CONNECTIONS", defaults.max_connections)?,
            ..defaults
        })
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the pool acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Driver connection options (TLS disabled).
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.user)
            .database(&self.database)
            .password(&self.password)
            .port(self.port)
            .ssl_mode(PgSslMode::Disable)
    }
}

// The password never reaches logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("password", &"***")
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
