use chrono::Duration;
use std::env;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::auth::AdminAuth;
use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DATABASE_PATH: &str = "data/bookings.csv";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

// Settings read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: String,
    pub admin: Option<AdminCredentials>,
    pub session_secret: Option<String>,
    pub session_ttl_minutes: i64,
    pub simulate_provider_delays: bool,
    pub is_production: bool,
    pub sentry_dsn: Option<String>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env` first
    /// when present
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenv::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Unset and blank are treated the same
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let is_production = get("ENVIRONMENT")
            .map(|val| val.to_lowercase() == "production")
            .unwrap_or(false);

        let bind_addr_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR".to_string(),
                value: bind_addr_raw.clone(),
            })?;

        let database_path =
            get("BOOKING_DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let session_ttl_minutes = match get("ADMIN_SESSION_TTL_MINUTES") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "ADMIN_SESSION_TTL_MINUTES".to_string(),
                        value: raw,
                    })
                }
            },
            None => DEFAULT_SESSION_TTL_MINUTES,
        };

        let simulate_provider_delays = match get("SIMULATE_PROVIDER_DELAYS") {
            Some(raw) => parse_bool("SIMULATE_PROVIDER_DELAYS", &raw)?,
            None => true,
        };

        let admin_email = get("ADMIN_EMAIL");
        let admin_password = get("ADMIN_PASSWORD");
        let session_secret = get("ADMIN_SESSION_SECRET");

        if is_production {
            for (key, value) in [
                ("ADMIN_EMAIL", &admin_email),
                ("ADMIN_PASSWORD", &admin_password),
                ("ADMIN_SESSION_SECRET", &session_secret),
            ] {
                if value.is_none() {
                    return Err(ConfigError::Missing(key.to_string()));
                }
            }
        }

        let admin = match (admin_email, admin_password) {
            (Some(email), Some(password)) => Some(AdminCredentials { email, password }),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            database_path,
            admin,
            session_secret,
            session_ttl_minutes,
            simulate_provider_delays,
            is_production,
            sentry_dsn: get("SENTRY_DSN"),
        })
    }

    /// Admin authentication, or None when no credentials are configured
    pub fn admin_auth(&self) -> Option<AdminAuth> {
        let Some(credentials) = &self.admin else {
            warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set - admin login disabled");
            return None;
        };

        let secret = match &self.session_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!("ADMIN_SESSION_SECRET not set - using a random secret for this process");
                AdminAuth::generate_secret()
            }
        };

        Some(AdminAuth::new(
            &credentials.email,
            &credentials.password,
            secret.as_bytes(),
            Duration::minutes(self.session_ttl_minutes),
        ))
    }
}
