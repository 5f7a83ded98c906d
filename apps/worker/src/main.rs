//! Ephemail retention worker runtime.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use ephemail_application::{
    CleanupReport, CleanupSettingsRepository, RetentionService, StepOutcome,
};
use ephemail_core::{AppError, AppResult};
use ephemail_domain::CleanupStep;
use ephemail_infrastructure::{
    HttpRelayKeepAlive, PostgresCleanupSettingsRepository, PostgresRetentionStore,
    RedisCleanupSettingsRepository,
};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Once,
    Loop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SettingsBackend {
    Postgres,
    Redis { url: String, key_prefix: String },
}

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    settings_backend: SettingsBackend,
    relay_base_url: Option<String>,
    relay_liveness_path: String,
    interval_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mode = parse_run_mode(env::args().nth(1).as_deref())?;
    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let retention_service = build_retention_service(pool, &config)?;

    info!(
        mode = ?mode,
        interval_seconds = config.interval_seconds,
        relay_configured = config.relay_base_url.is_some(),
        "ephemail-worker started"
    );

    match mode {
        RunMode::Once => {
            let report = retention_service.run_pass().await;
            log_report(&report);
        }
        RunMode::Loop => loop {
            let report = retention_service.run_pass().await;
            log_report(&report);
            tokio::time::sleep(Duration::from_secs(config.interval_seconds)).await;
        },
    }

    Ok(())
}

fn parse_run_mode(argument: Option<&str>) -> AppResult<RunMode> {
    match argument {
        None => Ok(RunMode::Loop),
        Some("once") => Ok(RunMode::Once),
        Some(other) => Err(AppError::Validation(format!(
            "unknown worker command '{other}', expected 'once' or no argument"
        ))),
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_retention_service(pool: PgPool, config: &WorkerConfig) -> AppResult<RetentionService> {
    let store = Arc::new(PostgresRetentionStore::new(pool.clone()));
    let settings_repository: Arc<dyn CleanupSettingsRepository> = match &config.settings_backend
    {
        SettingsBackend::Postgres => Arc::new(PostgresCleanupSettingsRepository::new(pool)),
        SettingsBackend::Redis { url, key_prefix } => {
            let client = redis::Client::open(url.as_str()).map_err(|error| {
                AppError::Validation(format!("invalid REDIS_URL '{url}': {error}"))
            })?;
            Arc::new(RedisCleanupSettingsRepository::new(
                client,
                key_prefix.as_str(),
            ))
        }
    };

    let service = RetentionService::new(store, settings_repository);
    match config.relay_base_url.as_deref() {
        Some(base_url) => {
            let relay = HttpRelayKeepAlive::new(base_url, config.relay_liveness_path.as_str())?;
            Ok(service.with_relay(Arc::new(relay)))
        }
        None => Ok(service),
    }
}

fn log_report(report: &CleanupReport) {
    for entry in &report.steps {
        let step = entry.step.to_string();
        match &entry.outcome {
            StepOutcome::Succeeded { affected_rows } => info!(
                pass_id = %report.pass_id,
                step = %step,
                affected_rows = affected_rows.unwrap_or_default(),
                "cleanup step succeeded"
            ),
            StepOutcome::Skipped { reason } => info!(
                pass_id = %report.pass_id,
                step = %step,
                reason = %reason,
                "cleanup step skipped"
            ),
            StepOutcome::Failed { error } => match &entry.step {
                CleanupStep::CustomRule { name } => warn!(
                    pass_id = %report.pass_id,
                    step = %step,
                    rule_name = %name,
                    error = %error,
                    "cleanup step failed"
                ),
                CleanupStep::RelayPing | CleanupStep::LoadSettings | CleanupStep::Sweep { .. } => {
                    warn!(
                        pass_id = %report.pass_id,
                        step = %step,
                        error = %error,
                        "cleanup step failed"
                    )
                }
            },
        }
    }

    info!(
        pass_id = %report.pass_id,
        deleted_rows = report.deleted_rows(),
        failed_steps = report.failures().count(),
        "cleanup pass finished"
    );
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let settings_backend = load_settings_backend()?;
        let relay_base_url = optional_env("RELAY_BASE_URL");
        let relay_liveness_path =
            optional_env("RELAY_LIVENESS_PATH").unwrap_or_else(|| "/health".to_owned());
        let interval_seconds = parse_env_u64("RETENTION_INTERVAL_SECONDS", 3600)?;

        if interval_seconds == 0 {
            return Err(AppError::Validation(
                "RETENTION_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            settings_backend,
            relay_base_url,
            relay_liveness_path,
            interval_seconds,
        })
    }
}

fn load_settings_backend() -> AppResult<SettingsBackend> {
    let backend = optional_env("SETTINGS_BACKEND").unwrap_or_else(|| "postgres".to_owned());

    match backend.to_ascii_lowercase().as_str() {
        "postgres" => Ok(SettingsBackend::Postgres),
        "redis" => Ok(SettingsBackend::Redis {
            url: required_env("REDIS_URL")?,
            key_prefix: optional_env("REDIS_KEY_PREFIX").unwrap_or_else(|| "ephemail".to_owned()),
        }),
        other => Err(AppError::Validation(format!(
            "SETTINGS_BACKEND must be 'postgres' or 'redis', got '{other}'"
        ))),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::{RunMode, parse_run_mode};

    #[test]
    fn run_mode_defaults_to_loop() {
        assert!(matches!(parse_run_mode(None), Ok(RunMode::Loop)));
        assert!(matches!(parse_run_mode(Some("once")), Ok(RunMode::Once)));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(parse_run_mode(Some("forever")).is_err());
    }
}
