//! Environment configuration, loaded once at process start.
//!
//! Every knob comes from the environment; missing required variables
//! fail startup with the variable named in the error. The loaded struct
//! is immutable for the life of the process.

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while reading the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {name}")]
    Missing { name: &'static str },
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Runtime mode controlling log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Debug,
    Release,
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
}

impl DatabaseConfig {
    /// Connection URL for diesel-async.
    pub fn url(&self) -> String {
        format!(
            "postgres://{user}:{password}@{host}:{port}/{dbname}?sslmode={sslmode}",
            user = self.user,
            password = self.password,
            host = self.host,
            port = self.port,
            dbname = self.dbname,
            sslmode = self.sslmode,
        )
    }
}

/// Redis connection settings.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: String,
    pub password: String,
    pub db: i64,
}

impl RedisConfig {
    /// Connection URL for the redis client.
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.host, self.port, self.db)
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                self.password, self.host, self.port, self.db
            )
        }
    }
}

/// Outbound webhook settings.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    /// Opt-out of certificate verification; verification is on unless
    /// this is explicitly enabled.
    pub insecure_skip_verify: bool,
}

/// Immutable application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub port: u16,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub webhook: WebhookConfig,
    pub api_key: String,
    pub stats_window_mins: i64,
}

impl AppConfig {
    /// Read the full configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = match optional("MODE").as_deref() {
            None | Some("debug") => Mode::Debug,
            Some("release") => Mode::Release,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "MODE",
                    message: format!("expected debug or release, got {other}"),
                });
            }
        };

        Ok(Self {
            mode,
            port: parsed("PORT", optional("PORT").unwrap_or_else(|| "8080".to_owned()))?,
            database: DatabaseConfig {
                host: required("POSTGRES_HOST")?,
                port: required("POSTGRES_PORT")?,
                user: required("POSTGRES_USER")?,
                password: required("POSTGRES_PASSWORD")?,
                dbname: required("POSTGRES_DB")?,
                sslmode: required("POSTGRES_SSLMODE")?,
            },
            redis: RedisConfig {
                host: required("REDIS_HOST")?,
                port: required("REDIS_PORT")?,
                password: optional("REDIS_PASSWORD").unwrap_or_default(),
                db: parsed("REDIS_DB", optional("REDIS_DB").unwrap_or_else(|| "0".to_owned()))?,
            },
            webhook: WebhookConfig {
                url: required("WEBHOOK_URL")?,
                insecure_skip_verify: flag("WEBHOOK_INSECURE_SKIP_VERIFY"),
            },
            api_key: required("API_KEY")?,
            stats_window_mins: parsed(
                "STATS_TIME_WINDOW_MINS",
                optional("STATS_TIME_WINDOW_MINS").unwrap_or_else(|| "60".to_owned()),
            )?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing { name })
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parsed<T>(name: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|parse_error: T::Err| ConfigError::Invalid {
        name,
        message: parse_error.to_string(),
    })
}

fn flag(name: &str) -> bool {
    matches!(
        optional(name).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}
