use async_trait::async_trait;
use ephemail_core::AppResult;
use ephemail_domain::{CleanupSettings, DeletionRule};

/// Datastore port executing retention deletions.
#[async_trait]
pub trait RetentionStore: Send + Sync {
    /// Deletes every record the rule matches and returns how many were removed.
    ///
    /// Deleting from an empty category is not an error and returns zero.
    async fn delete(&self, rule: &DeletionRule) -> AppResult<u64>;
}

/// Key-value port for the cleanup settings document.
#[async_trait]
pub trait CleanupSettingsRepository: Send + Sync {
    /// Loads the stored document, or `None` when nothing is stored.
    async fn load_settings(&self) -> AppResult<Option<CleanupSettings>>;

    /// Replaces the stored document.
    async fn save_settings(&self, settings: &CleanupSettings) -> AppResult<()>;
}

/// Keep-alive port for the companion notification relay.
#[async_trait]
pub trait RelayKeepAlive: Send + Sync {
    /// Pings the relay liveness endpoint.
    async fn ping(&self) -> AppResult<()>;
}
