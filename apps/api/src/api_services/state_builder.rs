use std::sync::Arc;

use ephemail_application::{CleanupSettingsRepository, RetentionService};
use ephemail_core::AppError;
use ephemail_infrastructure::{
    HttpRelayKeepAlive, PostgresCleanupSettingsRepository, PostgresRetentionStore,
    RedisCleanupSettingsRepository,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::{ApiConfig, SettingsBackendConfig};
use crate::state::AppState;

use super::build_redis_client;

pub fn build_app_state(config: &ApiConfig, pool: PgPool) -> Result<AppState, AppError> {
    let store = Arc::new(PostgresRetentionStore::new(pool.clone()));
    let (settings_repository, redis_client): (
        Arc<dyn CleanupSettingsRepository>,
        Option<redis::Client>,
    ) = match &config.settings_backend {
        SettingsBackendConfig::Postgres => (
            Arc::new(PostgresCleanupSettingsRepository::new(pool.clone())),
            None,
        ),
        SettingsBackendConfig::Redis { url, key_prefix } => {
            let client = build_redis_client(url)?;
            (
                Arc::new(RedisCleanupSettingsRepository::new(
                    client.clone(),
                    key_prefix.as_str(),
                )),
                Some(client),
            )
        }
    };

    let mut retention_service = RetentionService::new(store, settings_repository);
    if let Some(relay) = &config.relay {
        let keep_alive = HttpRelayKeepAlive::new(&relay.base_url, &relay.liveness_path)?;
        info!(url = %keep_alive.liveness_url(), "relay keep-alive configured");
        retention_service = retention_service.with_relay(Arc::new(keep_alive));
    }

    Ok(AppState {
        retention_service,
        postgres_pool: pool,
        redis_client,
        admin_token: Arc::from(config.admin_token.as_str()),
    })
}
