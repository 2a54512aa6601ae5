/**
 * Server Configuration
 *
 * Loads the relay's configuration from environment variables (after
 * `dotenv`), with development-friendly defaults.
 *
 * # Variables
 *
 * | Variable                 | Default       | Notes                                 |
 * |--------------------------|---------------|---------------------------------------|
 * | `SERVER_PORT`            | `3000`        |                                       |
 * | `APP_ENV`                | `development` |                                       |
 * | `JWT_SECRET`             | required      | HS256 secret for chat tokens          |
 * | `CORS_ORIGINS`           | see below     | comma separated, `*` allows all       |
 * | `DATABASE_URL`           | unset         | unset or unreachable: in-memory store |
 * | `RELAY_OUTBOUND_BUFFER`  | `64`          | per-connection queue capacity         |
 * | `RELAY_CLOSE_SUPERSEDED` | `true`        | close replaced connections            |
 *
 * Without `CORS_ORIGINS`, development allows the local dev servers and
 * every other environment only admits clients that send no `Origin`.
 *
 * # Error Handling
 *
 * Invalid values fail startup with a `ConfigError`. The database is the
 * exception: failing to reach it is logged and the relay continues with
 * the in-memory store.
 */

use sqlx::PgPool;
use std::net::SocketAddr;
use thiserror::Error;

use crate::backend::realtime::RelaySettings;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Browser origins allowed in development when `CORS_ORIGINS` is unset
pub const DEV_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:8080",
    "http://localhost:8081",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
    "http://127.0.0.1:8081",
];

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration value: {0}")]
    MissingValue(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Complete relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub database_url: Option<String>,
    pub relay: RelaySettings,
}

impl RelayConfig {
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::default()
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut builder = Self::builder();

        if let Some(port) = get("SERVER_PORT") {
            builder = builder.port(parse_value("SERVER_PORT", &port)?);
        }
        if let Some(environment) = get("APP_ENV") {
            builder = builder.environment(environment);
        }
        if let Some(secret) = get("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        if let Some(origins) = get("CORS_ORIGINS") {
            builder = builder.cors_origins(
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string),
            );
        }
        if let Some(url) = get("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(buffer) = get("RELAY_OUTBOUND_BUFFER") {
            builder = builder.outbound_buffer(parse_value("RELAY_OUTBOUND_BUFFER", &buffer)?);
        }
        if let Some(close) = get("RELAY_CLOSE_SUPERSEDED") {
            builder = builder.close_superseded(parse_flag("RELAY_CLOSE_SUPERSEDED", &close)?);
        }

        builder.build()
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Address to listen on (all interfaces)
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Builder for [`RelayConfig`]
#[derive(Debug, Default)]
pub struct RelayConfigBuilder {
    port: Option<u16>,
    environment: Option<String>,
    jwt_secret: Option<String>,
    cors_origins: Option<Vec<String>>,
    database_url: Option<String>,
    outbound_buffer: Option<usize>,
    close_superseded: Option<bool>,
}

impl RelayConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn cors_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_origins = Some(origins.into_iter().map(Into::into).collect());
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn outbound_buffer(mut self, buffer: usize) -> Self {
        self.outbound_buffer = Some(buffer);
        self
    }

    pub fn close_superseded(mut self, close: bool) -> Self {
        self.close_superseded = Some(close);
        self
    }

    /// Validate and fill in defaults
    pub fn build(self) -> Result<RelayConfig, ConfigError> {
        let jwt_secret = self
            .jwt_secret
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingValue("JWT_SECRET"))?;

        let defaults = RelaySettings::default();
        let outbound_buffer = self.outbound_buffer.unwrap_or(defaults.outbound_buffer);
        if outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RELAY_OUTBOUND_BUFFER",
                value: "0".to_string(),
            });
        }

        let environment = self
            .environment
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let cors_origins = match self.cors_origins {
            Some(origins) => origins,
            None if environment.eq_ignore_ascii_case(DEFAULT_ENVIRONMENT) => {
                DEV_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
            }
            None => Vec::new(),
        };

        Ok(RelayConfig {
            port: self.port.unwrap_or(DEFAULT_PORT),
            environment,
            jwt_secret,
            cors_origins,
            database_url: self.database_url,
            relay: RelaySettings {
                outbound_buffer,
                close_superseded: self.close_superseded.unwrap_or(defaults.close_superseded),
            },
        })
    }
}

/// Connect to PostgreSQL if configured
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if no URL is configured or the connection fails
///
/// # Errors
///
/// Errors are logged but do not prevent server startup; the caller falls
/// back to the in-memory store.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Messages will be kept in memory only.");
        return None;
    };

    tracing::info!("Connecting to database...");

    match PgPool::connect(database_url).await {
        Ok(pool) => {
            tracing::info!("Database connection pool created successfully");
            Some(pool)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create database connection pool");
            tracing::warn!("Messages will be kept in memory only.");
            None
        }
    }
}
