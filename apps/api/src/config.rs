//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Signing secret used when `JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "shopcart-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// JWT lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Bootstrap admin account, created on startup if missing
    pub admin_email: Option<String>,

    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: parse_var("HTTP_PORT", "8080")?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./shopcart.db".to_string()),

            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "5")?,

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),

            jwt_lifetime_secs: parse_var("JWT_LIFETIME_SECS", "3600")?, // 1 hour

            admin_email: env::var("ADMIN_EMAIL").ok(),

            admin_password: env::var("ADMIN_PASSWORD").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SECRET".to_string()));
        }
        if self.admin_email.is_some() != self.admin_password.is_some() {
            return Err(ConfigError::MissingRequired(
                "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// `true` when running with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Bootstrap admin credentials, if configured.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
