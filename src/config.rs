//! Configuration types.
//!
//! Everything is read once at startup and never changes afterwards. Loading goes
//! through a lookup function so tests can supply fixed values without touching
//! the process environment.

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Implicit-TLS SMTP submission port.
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Connection credentials for the outbound mail server.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Authenticated identity, also used as the `From` address.
    pub username: String,
    pub password: SecretString,
    /// Applies to the TCP connect and to every read/write on the socket.
    pub timeout: Duration,
}

/// Process-wide service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub smtp: SmtpConfig,
    /// Business inbox that receives every quote request.
    pub recipient: String,
    /// Origins allowed to call the relay cross-origin. `*` allows any.
    pub allowed_origins: Vec<String>,
    pub bind_addr: SocketAddr,
}

impl ServiceConfig {
    /// Build config from environment variables.
    ///
    /// Reads `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`, `TO_EMAIL`,
    /// `ALLOWED_ORIGINS`, `SMTP_TIMEOUT_SECS`, `BIND_HOST` and `PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.into()));

        let host = require("SMTP_HOST")?;
        let port = parse_or(get("SMTP_PORT"), "SMTP_PORT", DEFAULT_SMTP_PORT)?;
        let username = require("SMTP_USER")?;
        let password = SecretString::from(require("SMTP_PASS")?);
        let recipient = require("TO_EMAIL")?;

        let timeout_secs = parse_or(
            get("SMTP_TIMEOUT_SECS"),
            "SMTP_TIMEOUT_SECS",
            DEFAULT_SMTP_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SMTP_TIMEOUT_SECS".into(),
                message: "must be greater than zero".into(),
            });
        }

        let allowed_origins = parse_origins(&get("ALLOWED_ORIGINS").unwrap_or_else(|| "*".into()));

        let bind_host = get("BIND_HOST").unwrap_or_else(|| DEFAULT_BIND_HOST.into());
        let bind_port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let bind_addr = format!("{bind_host}:{bind_port}")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "BIND_HOST".into(),
                message: e.to_string(),
            })?;

        Ok(Self {
            smtp: SmtpConfig {
                host,
                port,
                username,
                password,
                timeout: Duration::from_secs(timeout_secs),
            },
            recipient,
            allowed_origins,
            bind_addr,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.into(),
            message: format!("{value:?}: {e}"),
        }),
        None => Ok(default),
    }
}

/// Whether an origin list lets any origin call the relay.
pub fn allows_any_origin(origins: &[String]) -> bool {
    origins.iter().any(|o| o == "*")
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
