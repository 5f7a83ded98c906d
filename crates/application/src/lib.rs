//! Application services and ports.

#![forbid(unsafe_code)]

mod retention_ports;
mod retention_service;

pub use retention_ports::{CleanupSettingsRepository, RelayKeepAlive, RetentionStore};
pub use retention_service::{CleanupReport, CleanupStepReport, RetentionService, StepOutcome};
