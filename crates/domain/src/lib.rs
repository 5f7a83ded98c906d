//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod cleanup_filter;
mod cleanup_plan;
mod cleanup_settings;
mod mailbox;
mod retention;

pub use cleanup_filter::{CleanupFilter, CleanupTarget, MAX_FILTER_PATTERN_LENGTH};
pub use cleanup_plan::{CleanupPlan, CleanupStep, DeletionRule, PlannedAction, PlannedDeletion};
pub use cleanup_settings::{
    CLEANUP_SETTINGS_KEY, CategorySetting, CleanupSettings, CustomCleanupRule,
};
pub use mailbox::{AddressRecord, MailRecord, SentMailRecord};
pub use retention::{
    CleanupCategory, DEFAULT_RETENTION_DAYS, MAX_RETENTION_DAYS, RetentionWindow,
};
