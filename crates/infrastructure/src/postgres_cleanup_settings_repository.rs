//! PostgreSQL-backed cleanup settings repository using the `settings` table.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use ephemail_application::CleanupSettingsRepository;
use ephemail_core::{AppError, AppResult};
use ephemail_domain::{CLEANUP_SETTINGS_KEY, CleanupSettings};


/// PostgreSQL implementation of the cleanup settings repository port.
#[derive(Clone)]
pub struct PostgresCleanupSettingsRepository {
    pool: PgPool,
}

impl PostgresCleanupSettingsRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CleanupSettingsRepository for PostgresCleanupSettingsRepository {
    async fn load_settings(&self) -> AppResult<Option<CleanupSettings>> {
        let value = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT value
            FROM settings
            WHERE key = $1
            "#,
        )
        .bind(CLEANUP_SETTINGS_KEY)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load cleanup settings: {error}")))?;

        value
            .map(|value| {
                serde_json::from_value::<CleanupSettings>(value).map_err(|error| {
                    AppError::Internal(format!("stored cleanup settings are invalid: {error}"))
                })
            })
            .transpose()
    }

    async fn save_settings(&self, settings: &CleanupSettings) -> AppResult<()> {
        let value = serde_json::to_value(settings).map_err(|error| {
            AppError::Internal(format!("failed to encode cleanup settings: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(CLEANUP_SETTINGS_KEY)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save cleanup settings: {error}")))?;

        Ok(())
    }
}
