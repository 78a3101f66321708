use derive_getters::Getters;
use std::env;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings read from the environment (and `.env`).
#[derive(Debug, Clone, Getters)]
pub struct Config {
    /// `None` leaves the service running without a database; every data
    /// request then reports a configuration error.
    database_url: Option<String>,
    database_max_connections: u32,
    host: String,
    port: u16,
    admin_password: String,
    cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: get("DATABASE_URL"),
            database_max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                5,
            )?,
            host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse("SERVER_PORT", get("SERVER_PORT"), 3000)?,
            admin_password: get("ADMIN_PASSWORD").unwrap_or_else(|| "admin".to_string()),
            cookie_secure: parse("COOKIE_SECURE", get("COOKIE_SECURE"), false)?,
        })
    }

    pub fn with_address(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                key: "SERVER_HOST",
                value: self.host.clone(),
            })
    }
}

fn parse<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
