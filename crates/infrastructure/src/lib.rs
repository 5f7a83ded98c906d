//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_relay_keep_alive;
mod in_memory_cleanup_settings_repository;
mod in_memory_retention_store;
mod postgres_cleanup_settings_repository;
mod postgres_retention_store;
mod redis_cleanup_settings_repository;

pub use http_relay_keep_alive::{HttpRelayKeepAlive, RELAY_PING_TIMEOUT};
pub use in_memory_cleanup_settings_repository::InMemoryCleanupSettingsRepository;
pub use in_memory_retention_store::InMemoryRetentionStore;
pub use postgres_cleanup_settings_repository::PostgresCleanupSettingsRepository;
pub use postgres_retention_store::PostgresRetentionStore;
pub use redis_cleanup_settings_repository::RedisCleanupSettingsRepository;
