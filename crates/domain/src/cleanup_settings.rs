//! Stored cleanup configuration document.
//!
//! Field names follow the camelCase JSON document persisted under the
//! `cleanup_settings` key, including the historical `Unknow` spelling for the
//! unrouted-mail category.

use std::collections::HashSet;

use ephemail_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{CleanupCategory, CleanupFilter, RetentionWindow};

/// Settings store key holding the cleanup document.
pub const CLEANUP_SETTINGS_KEY: &str = "cleanup_settings";

/// Per-category enable flags, windows and custom rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleanupSettings {
    /// Overrides the mail window.
    pub enable_mails_auto_cleanup: bool,
    /// Mail window in days.
    pub clean_mails_days: Option<i64>,
    /// Overrides the unrouted-mail window.
    #[serde(
        rename = "enableUnknowMailsAutoCleanup",
        alias = "enableUnknownMailsAutoCleanup"
    )]
    pub enable_unrouted_mails_auto_cleanup: bool,
    /// Unrouted-mail window in days.
    #[serde(rename = "cleanUnknowMailsDays", alias = "cleanUnknownMailsDays")]
    pub clean_unrouted_mails_days: Option<i64>,
    /// Overrides the sendbox window.
    pub enable_send_box_auto_cleanup: bool,
    /// Sendbox window in days.
    pub clean_send_box_days: Option<i64>,
    /// Overrides the address-by-creation window.
    pub enable_address_auto_cleanup: bool,
    /// Address-by-creation window in days.
    pub clean_address_days: Option<i64>,
    /// Enables the inactive-address sweep.
    pub enable_inactive_address_auto_cleanup: bool,
    /// Inactivity window in days.
    pub clean_inactive_address_days: Option<i64>,
    /// Enables the never-bound-address sweep.
    pub enable_unbound_address_auto_cleanup: bool,
    /// Never-bound window in days.
    pub clean_unbound_address_days: Option<i64>,
    /// Enables the empty-address sweep.
    pub enable_empty_address_auto_cleanup: bool,
    /// Empty-address window in days.
    pub clean_empty_address_days: Option<i64>,
    /// Ordered named custom rules.
    pub custom_cleanup_rules: Vec<CustomCleanupRule>,
}

/// Enable flag and configured days for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySetting {
    /// Whether auto cleanup is enabled for the category.
    pub enabled: bool,
    /// Configured window in days, if any.
    pub days: Option<i64>,
}

impl CategorySetting {
    /// Returns the configured window when enabled and valid.
    #[must_use]
    pub fn configured_window(&self) -> Option<RetentionWindow> {
        if !self.enabled {
            return None;
        }

        self.days.and_then(|days| RetentionWindow::new(days).ok())
    }
}

impl CleanupSettings {
    /// Returns the flag and window configured for a category.
    #[must_use]
    pub fn category_setting(&self, category: CleanupCategory) -> CategorySetting {
        let (enabled, days) = match category {
            CleanupCategory::Mails => (self.enable_mails_auto_cleanup, self.clean_mails_days),
            CleanupCategory::UnroutedMails => (
                self.enable_unrouted_mails_auto_cleanup,
                self.clean_unrouted_mails_days,
            ),
            CleanupCategory::Sendbox => {
                (self.enable_send_box_auto_cleanup, self.clean_send_box_days)
            }
            CleanupCategory::AddressByCreation => {
                (self.enable_address_auto_cleanup, self.clean_address_days)
            }
            CleanupCategory::InactiveAddress => (
                self.enable_inactive_address_auto_cleanup,
                self.clean_inactive_address_days,
            ),
            CleanupCategory::UnboundAddress => (
                self.enable_unbound_address_auto_cleanup,
                self.clean_unbound_address_days,
            ),
            CleanupCategory::EmptyAddress => (
                self.enable_empty_address_auto_cleanup,
                self.clean_empty_address_days,
            ),
        };

        CategorySetting { enabled, days }
    }

    /// Returns a copy with one category's flag and days replaced.
    #[must_use]
    pub fn with_category(
        mut self,
        category: CleanupCategory,
        enabled: bool,
        days: Option<i64>,
    ) -> Self {
        let (flag, window) = match category {
            CleanupCategory::Mails => (
                &mut self.enable_mails_auto_cleanup,
                &mut self.clean_mails_days,
            ),
            CleanupCategory::UnroutedMails => (
                &mut self.enable_unrouted_mails_auto_cleanup,
                &mut self.clean_unrouted_mails_days,
            ),
            CleanupCategory::Sendbox => (
                &mut self.enable_send_box_auto_cleanup,
                &mut self.clean_send_box_days,
            ),
            CleanupCategory::AddressByCreation => (
                &mut self.enable_address_auto_cleanup,
                &mut self.clean_address_days,
            ),
            CleanupCategory::InactiveAddress => (
                &mut self.enable_inactive_address_auto_cleanup,
                &mut self.clean_inactive_address_days,
            ),
            CleanupCategory::UnboundAddress => (
                &mut self.enable_unbound_address_auto_cleanup,
                &mut self.clean_unbound_address_days,
            ),
            CleanupCategory::EmptyAddress => (
                &mut self.enable_empty_address_auto_cleanup,
                &mut self.clean_empty_address_days,
            ),
        };

        *flag = enabled;
        *window = days;
        self
    }

    /// Returns a copy with a custom rule appended.
    #[must_use]
    pub fn with_custom_rule(mut self, rule: CustomCleanupRule) -> Self {
        self.custom_cleanup_rules.push(rule);
        self
    }

    /// Returns the window a mandatory category is swept with.
    ///
    /// Falls back to the one-day default when the flag is off or the
    /// configured days value is missing or not positive.
    #[must_use]
    pub fn mandatory_window(&self, category: CleanupCategory) -> RetentionWindow {
        self.category_setting(category)
            .configured_window()
            .unwrap_or_else(RetentionWindow::fallback)
    }

    /// Validates the document before it is persisted.
    ///
    /// Enabled categories must carry a window of at least one day, custom rule
    /// names must be unique and non-blank, and every filter must be valid.
    pub fn validate(&self) -> AppResult<()> {
        for category in CleanupCategory::all() {
            let setting = self.category_setting(category);
            if setting.enabled {
                let days = setting.days.ok_or_else(|| {
                    AppError::Validation(format!(
                        "cleanup for '{category}' is enabled but has no retention days"
                    ))
                })?;
                RetentionWindow::new(days).map_err(|error| {
                    AppError::Validation(format!("invalid retention for '{category}': {error}"))
                })?;
            }
        }

        let mut seen_names = HashSet::new();
        for rule in &self.custom_cleanup_rules {
            let name = NonEmptyString::new(rule.name.trim()).map_err(|_| {
                AppError::Validation("custom cleanup rule name must not be empty".to_owned())
            })?;
            let name = name.as_str();

            if !seen_names.insert(name.to_owned()) {
                return Err(AppError::Validation(format!(
                    "duplicate custom cleanup rule name '{name}'"
                )));
            }

            rule.filter.validate().map_err(|error| {
                AppError::Validation(format!("custom cleanup rule '{name}': {error}"))
            })?;
        }

        Ok(())
    }
}

/// Named, individually toggleable deletion rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomCleanupRule {
    /// Operator-facing rule name.
    pub name: String,
    /// Whether the rule runs during cleanup passes.
    pub enabled: bool,
    /// Deletion predicate.
    pub filter: CleanupFilter,
}

impl CustomCleanupRule {
    /// Creates a rule from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, enabled: bool, filter: CleanupFilter) -> Self {
        Self {
            name: name.into(),
            enabled,
            filter,
        }
    }
}
