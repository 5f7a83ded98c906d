use async_trait::async_trait;
use ephemail_application::CleanupSettingsRepository;
use ephemail_core::AppResult;
use ephemail_domain::CleanupSettings;
use tokio::sync::RwLock;

/// In-memory cleanup settings repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryCleanupSettingsRepository {
    settings: RwLock<Option<CleanupSettings>>,
}

impl InMemoryCleanupSettingsRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding an initial document.
    #[must_use]
    pub fn with_settings(settings: CleanupSettings) -> Self {
        Self {
            settings: RwLock::new(Some(settings)),
        }
    }
}

#[async_trait]
impl CleanupSettingsRepository for InMemoryCleanupSettingsRepository {
    async fn load_settings(&self) -> AppResult<Option<CleanupSettings>> {
        Ok(self.settings.read().await.clone())
    }

    async fn save_settings(&self, settings: &CleanupSettings) -> AppResult<()> {
        *self.settings.write().await = Some(settings.clone());
        Ok(())
    }
}
