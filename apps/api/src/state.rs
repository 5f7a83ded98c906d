use std::sync::Arc;

use ephemail_application::RetentionService;
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub retention_service: RetentionService,
    pub postgres_pool: PgPool,
    pub redis_client: Option<redis::Client>,
    pub admin_token: Arc<str>,
}
