use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ephemail_core::AppError;
use tracing_subscriber::EnvFilter;

/// Minimum accepted length of the admin bearer token.
pub const MIN_ADMIN_TOKEN_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsBackendConfig {
    Postgres,
    Redis { url: String, key_prefix: String },
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub base_url: String,
    pub liveness_path: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub admin_token: String,
    pub api_host: String,
    pub api_port: u16,
    pub settings_backend: SettingsBackendConfig,
    pub relay: Option<RelayConfig>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let admin_token = if migrate_only {
            String::new()
        } else {
            let admin_token = required_non_empty_env("ADMIN_TOKEN")?;
            if admin_token.len() < MIN_ADMIN_TOKEN_LENGTH {
                return Err(AppError::Validation(format!(
                    "ADMIN_TOKEN must be at least {MIN_ADMIN_TOKEN_LENGTH} characters"
                )));
            }
            admin_token
        };

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let settings_backend = match env::var("SETTINGS_BACKEND")
            .unwrap_or_else(|_| "postgres".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => SettingsBackendConfig::Postgres,
            "redis" => SettingsBackendConfig::Redis {
                url: required_non_empty_env("REDIS_URL")?,
                key_prefix: env::var("REDIS_KEY_PREFIX")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| "ephemail".to_owned()),
            },
            other => {
                return Err(AppError::Validation(format!(
                    "SETTINGS_BACKEND must be either 'postgres' or 'redis', got '{other}'"
                )));
            }
        };

        let relay = env::var("RELAY_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|base_url| RelayConfig {
                base_url,
                liveness_path: env::var("RELAY_LIVENESS_PATH")
                    .unwrap_or_else(|_| "/health".to_owned()),
            });

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            admin_token,
            api_host,
            api_port,
            settings_backend,
            relay,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
