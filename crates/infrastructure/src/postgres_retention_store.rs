//! PostgreSQL-backed retention store over the mail datastore tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use ephemail_application::RetentionStore;
use ephemail_core::{AppError, AppResult};
use ephemail_domain::{CleanupCategory, CustomCleanupRule, DeletionRule, RetentionWindow};

mod custom_filter;


/// PostgreSQL implementation of the retention store port.
#[derive(Clone)]
pub struct PostgresRetentionStore {
    pool: PgPool,
}

impl PostgresRetentionStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn sweep_category(
        &self,
        category: CleanupCategory,
        window: RetentionWindow,
    ) -> AppResult<u64> {
        let cutoff: DateTime<Utc> = window.cutoff(Utc::now())?;

        let result = sqlx::query(sweep_statement(category))
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to sweep cleanup category '{category}': {error}"
                ))
            })?;

        Ok(result.rows_affected())
    }

    async fn run_custom_rule(&self, rule: &CustomCleanupRule) -> AppResult<u64> {
        if rule.filter.is_empty() {
            return Err(AppError::Validation(format!(
                "custom cleanup rule '{}' has no deletion conditions",
                rule.name
            )));
        }
        rule.filter.validate()?;

        let mut builder = custom_filter::delete_statement(&rule.filter, Utc::now())?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to run custom cleanup rule '{}': {error}",
                    rule.name
                ))
            })?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RetentionStore for PostgresRetentionStore {
    async fn delete(&self, rule: &DeletionRule) -> AppResult<u64> {
        match rule {
            DeletionRule::Category { category, window } => {
                self.sweep_category(*category, *window).await
            }
            DeletionRule::Custom(rule) => self.run_custom_rule(rule).await,
        }
    }
}

fn sweep_statement(category: CleanupCategory) -> &'static str {
    match category {
        CleanupCategory::Mails => {
            r#"
            DELETE FROM raw_mails
            WHERE created_at < $1
            "#
        }
        CleanupCategory::UnroutedMails => {
            r#"
            DELETE FROM raw_mails
            WHERE created_at < $1
              AND NOT EXISTS (
                SELECT 1 FROM address WHERE address.name = raw_mails.address
              )
            "#
        }
        CleanupCategory::Sendbox => {
            r#"
            DELETE FROM sendbox
            WHERE created_at < $1
            "#
        }
        CleanupCategory::AddressByCreation => {
            r#"
            DELETE FROM address
            WHERE created_at < $1
            "#
        }
        CleanupCategory::InactiveAddress => {
            r#"
            DELETE FROM address
            WHERE updated_at < $1
            "#
        }
        CleanupCategory::UnboundAddress => {
            r#"
            DELETE FROM address
            WHERE created_at < $1
              AND NOT EXISTS (
                SELECT 1 FROM users_address WHERE users_address.address_id = address.id
              )
            "#
        }
        CleanupCategory::EmptyAddress => {
            r#"
            DELETE FROM address
            WHERE created_at < $1
              AND NOT EXISTS (
                SELECT 1 FROM raw_mails WHERE raw_mails.address = address.name
              )
            "#
        }
    }
}
