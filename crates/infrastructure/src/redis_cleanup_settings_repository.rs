//! Redis-backed cleanup settings repository.

use async_trait::async_trait;
use ephemail_application::CleanupSettingsRepository;
use ephemail_core::{AppError, AppResult};
use ephemail_domain::{CLEANUP_SETTINGS_KEY, CleanupSettings};
use redis::AsyncCommands;

/// Redis implementation of the cleanup settings repository port.
///
/// The document is stored as a JSON string under `{prefix}:cleanup_settings`.
#[derive(Clone)]
pub struct RedisCleanupSettingsRepository {
    client: redis::Client,
    key_prefix: String,
}

impl RedisCleanupSettingsRepository {
    /// Creates a repository with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn settings_key(&self) -> String {
        format!("{}:{CLEANUP_SETTINGS_KEY}", self.key_prefix)
    }
}

#[async_trait]
impl CleanupSettingsRepository for RedisCleanupSettingsRepository {
    async fn load_settings(&self) -> AppResult<Option<CleanupSettings>> {
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        let encoded: Option<String> = connection.get(self.settings_key()).await.map_err(|error| {
            AppError::Internal(format!("failed to read cleanup settings: {error}"))
        })?;

        encoded.as_deref().map(decode_settings).transpose()
    }

    async fn save_settings(&self, settings: &CleanupSettings) -> AppResult<()> {
        let encoded = serde_json::to_string(settings).map_err(|error| {
            AppError::Internal(format!("failed to encode cleanup settings: {error}"))
        })?;

        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        connection
            .set(self.settings_key(), encoded)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write cleanup settings: {error}"))
            })
    }
}

fn decode_settings(value: &str) -> AppResult<CleanupSettings> {
    serde_json::from_str(value).map_err(|error| {
        AppError::Internal(format!("stored cleanup settings are invalid: {error}"))
    })
}

#[cfg(test)]
mod tests {
    use ephemail_domain::CleanupCategory;

    use super::{RedisCleanupSettingsRepository, decode_settings};

    #[test]
    fn settings_key_is_namespaced_by_prefix() {
        let client = redis::Client::open("redis://127.0.0.1/")
            .unwrap_or_else(|error| panic!("valid redis url: {error}"));
        let repository = RedisCleanupSettingsRepository::new(client, "ephemail-test");

        assert_eq!(repository.settings_key(), "ephemail-test:cleanup_settings");
    }

    #[test]
    fn decode_reads_stored_document_and_rejects_garbage() {
        let decoded = decode_settings(r#"{"enableSendBoxAutoCleanup":true,"cleanSendBoxDays":4}"#);
        assert_eq!(
            decoded
                .map(|settings| settings.mandatory_window(CleanupCategory::Sendbox).days())
                .unwrap_or(0),
            4
        );

        assert!(decode_settings("not json").is_err());
    }
}
