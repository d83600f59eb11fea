use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Value shipped in the sample `.env`; treated as "not configured".
const PLACEHOLDER_API_KEY: &str = "your_upload_post_api_key_here";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// Per-session database connection parameters.
    pub database: DatabaseSettings,
    /// Approval webhook; approvals are refused while unset.
    pub webhook_url: Option<String>,
    /// Posting-API access.
    pub analytics: AnalyticsSettings,
    /// Timeout for every outbound HTTP call.
    pub http_timeout: Duration,
    /// `*` or a single origin.
    pub cors_allowed_origin: String,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

/// Connection parameters for the one connection each session holds.
#[derive(Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: PgSslMode,
    pub connect_timeout: Duration,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl DatabaseSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(self.ssl_mode)
            .application_name("content-ops-api")
    }

    /// `user@host:port/name`, for log lines.
    pub fn describe(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.name)
    }
}

#[derive(Clone)]
pub struct AnalyticsSettings {
    pub api_key: Option<String>,
    pub profile: String,
    pub base_url: String,
}

impl fmt::Debug for AnalyticsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("profile", &self.profile)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let database = DatabaseSettings {
            host: required("DB_HOST")?,
            port: parse_or(&get, "DB_PORT", 5432)?,
            name: get("DB_NAME").unwrap_or_else(|| "postgres".to_string()),
            user: required("DB_USER")?,
            password: get("DB_PASSWORD").unwrap_or_default(),
            ssl_mode: parse_or(&get, "DB_SSL_MODE", PgSslMode::Require)?,
            connect_timeout: Duration::from_secs(parse_or(&get, "DB_CONNECT_TIMEOUT_SECS", 10)?),
        };

        let api_key = get("UPLOAD_POST_API_KEY").filter(|k| k != PLACEHOLDER_API_KEY);

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8501)?,
            database,
            webhook_url: get("N8N_WEBHOOK_URL"),
            analytics: AnalyticsSettings {
                api_key,
                profile: get("UPLOAD_POST_PROFILE").unwrap_or_else(|| "default".to_string()),
                base_url: get("UPLOAD_POST_BASE_URL")
                    .unwrap_or_else(|| "https://api.upload-post.com".to_string())
                    .trim_end_matches('/')
                    .to_string(),
            },
            http_timeout: Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 30)?),
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| "*".to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
