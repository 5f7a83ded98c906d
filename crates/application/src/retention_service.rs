use std::sync::Arc;

use ephemail_core::{AppError, AppResult};
use ephemail_domain::{CleanupCategory, CleanupSettings, DeletionRule, RetentionWindow};
use tracing::info;

use crate::retention_ports::{CleanupSettingsRepository, RelayKeepAlive, RetentionStore};

mod pass;
mod report;


pub use report::{CleanupReport, CleanupStepReport, StepOutcome};

/// Retention scheduler running cleanup passes against the mail datastore.
#[derive(Clone)]
pub struct RetentionService {
    store: Arc<dyn RetentionStore>,
    settings_repository: Arc<dyn CleanupSettingsRepository>,
    relay: Option<Arc<dyn RelayKeepAlive>>,
}

impl RetentionService {
    /// Creates a retention service.
    #[must_use]
    pub fn new(
        store: Arc<dyn RetentionStore>,
        settings_repository: Arc<dyn CleanupSettingsRepository>,
    ) -> Self {
        Self {
            store,
            settings_repository,
            relay: None,
        }
    }

    /// Adds the notification relay pinged at the start of every pass.
    #[must_use]
    pub fn with_relay(mut self, relay: Arc<dyn RelayKeepAlive>) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Returns the stored cleanup settings, if any.
    pub async fn load_settings(&self) -> AppResult<Option<CleanupSettings>> {
        self.settings_repository.load_settings().await
    }

    /// Validates and stores cleanup settings.
    pub async fn save_settings(&self, settings: CleanupSettings) -> AppResult<CleanupSettings> {
        settings.validate()?;
        self.settings_repository.save_settings(&settings).await?;

        info!(
            custom_rules = settings.custom_cleanup_rules.len(),
            "cleanup settings saved"
        );
        Ok(settings)
    }

    /// Sweeps one category immediately with an explicit window.
    pub async fn cleanup_now(&self, category: CleanupCategory, days: i64) -> AppResult<u64> {
        let window = RetentionWindow::new(days).map_err(|error| {
            AppError::Validation(format!("invalid cleanup days for '{category}': {error}"))
        })?;

        let deleted = self
            .store
            .delete(&DeletionRule::sweep(category, window))
            .await?;

        info!(
            category = %category,
            retention_days = window.days(),
            affected_rows = deleted,
            "manual cleanup completed"
        );
        Ok(deleted)
    }
}
