use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use ephemail_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Retention window applied to mandatory categories without an enabled override.
pub const DEFAULT_RETENTION_DAYS: u32 = 1;

/// Longest accepted retention window, roughly one hundred years.
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// Record categories the retention scheduler knows how to sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CleanupCategory {
    /// Every stored inbound mail, by arrival time.
    #[serde(rename = "mails")]
    Mails,
    /// Inbound mail addressed to an address that no longer exists.
    #[serde(rename = "mails_unknow")]
    UnroutedMails,
    /// Outbound mail records.
    #[serde(rename = "sendbox")]
    Sendbox,
    /// Addresses by creation time.
    #[serde(rename = "address")]
    AddressByCreation,
    /// Addresses by last activity time.
    #[serde(rename = "inactive_address")]
    InactiveAddress,
    /// Addresses that were never bound to an account.
    #[serde(rename = "unbound_address")]
    UnboundAddress,
    /// Addresses that never received any mail.
    #[serde(rename = "empty_address")]
    EmptyAddress,
}

impl CleanupCategory {
    /// Categories swept on every pass, in execution order.
    pub const MANDATORY: [Self; 4] = [
        Self::Mails,
        Self::UnroutedMails,
        Self::Sendbox,
        Self::AddressByCreation,
    ];

    /// Categories swept only when explicitly enabled, in execution order.
    pub const OPTIONAL: [Self; 3] = [
        Self::InactiveAddress,
        Self::UnboundAddress,
        Self::EmptyAddress,
    ];

    /// Returns the stable storage identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mails => "mails",
            Self::UnroutedMails => "mails_unknow",
            Self::Sendbox => "sendbox",
            Self::AddressByCreation => "address",
            Self::InactiveAddress => "inactive_address",
            Self::UnboundAddress => "unbound_address",
            Self::EmptyAddress => "empty_address",
        }
    }

    /// Returns whether the category is swept regardless of configuration.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        Self::MANDATORY.contains(self)
    }

    /// Returns every known category: mandatory first, then optional.
    #[must_use]
    pub fn all() -> [Self; 7] {
        [
            Self::Mails,
            Self::UnroutedMails,
            Self::Sendbox,
            Self::AddressByCreation,
            Self::InactiveAddress,
            Self::UnboundAddress,
            Self::EmptyAddress,
        ]
    }
}

impl Display for CleanupCategory {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for CleanupCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown cleanup category '{value}'")))
    }
}

/// Age threshold in whole days, between one day and [`MAX_RETENTION_DAYS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct RetentionWindow(u32);

impl RetentionWindow {
    /// Creates a validated retention window.
    pub fn new(days: i64) -> AppResult<Self> {
        if days < 1 {
            return Err(AppError::Validation(format!(
                "retention window must be at least 1 day, got {days}"
            )));
        }

        let days = u32::try_from(days)
            .ok()
            .filter(|days| *days <= MAX_RETENTION_DAYS)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "retention window must be at most {MAX_RETENTION_DAYS} days, got {days}"
                ))
            })?;

        Ok(Self(days))
    }

    /// Returns the one-day fallback window.
    #[must_use]
    pub fn fallback() -> Self {
        Self(DEFAULT_RETENTION_DAYS)
    }

    /// Returns the window length in days.
    #[must_use]
    pub fn days(&self) -> u32 {
        self.0
    }

    /// Returns the instant before which records become eligible for deletion.
    pub fn cutoff(&self, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        Duration::try_days(i64::from(self.0))
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "retention window of {} days is out of range for {now}",
                    self.0
                ))
            })
    }
}

impl TryFrom<i64> for RetentionWindow {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RetentionWindow> for u32 {
    fn from(value: RetentionWindow) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{DateTime, TimeZone, Utc};
    use ephemail_core::AppError;

    use super::{CleanupCategory, MAX_RETENTION_DAYS, RetentionWindow};

    #[test]
    fn mandatory_categories_keep_sweep_order() {
        assert_eq!(
            CleanupCategory::MANDATORY,
            [
                CleanupCategory::Mails,
                CleanupCategory::UnroutedMails,
                CleanupCategory::Sendbox,
                CleanupCategory::AddressByCreation,
            ]
        );
        assert!(
            CleanupCategory::OPTIONAL
                .iter()
                .all(|category| !category.is_mandatory())
        );
    }

    #[test]
    fn category_parses_storage_identifier() {
        let parsed = CleanupCategory::from_str("mails_unknow");
        assert!(matches!(parsed, Ok(CleanupCategory::UnroutedMails)));
        assert!(CleanupCategory::from_str("mailz").is_err());
    }

    #[test]
    fn retention_window_rejects_zero_and_negative_days() {
        assert!(RetentionWindow::new(0).is_err());
        assert!(RetentionWindow::new(-3).is_err());
        assert!(RetentionWindow::new(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn retention_window_is_bounded_above() {
        let longest = RetentionWindow::new(i64::from(MAX_RETENTION_DAYS));
        assert!(matches!(longest, Ok(window) if window.days() == MAX_RETENTION_DAYS));

        for days in [i64::from(MAX_RETENTION_DAYS) + 1, 100_000_000, i64::MAX] {
            assert!(matches!(
                RetentionWindow::new(days),
                Err(AppError::Validation(_))
            ));
        }

        let decoded = serde_json::from_str::<RetentionWindow>("100000000");
        assert!(decoded.is_err());
    }

    #[test]
    fn longest_window_cutoff_does_not_overflow() {
        let window = RetentionWindow::new(i64::from(MAX_RETENTION_DAYS))
            .unwrap_or_else(|_| panic!("valid window"));

        assert!(window.cutoff(Utc::now()).is_ok());
        assert!(window.cutoff(DateTime::<Utc>::MIN_UTC).is_err());
    }

    #[test]
    fn retention_window_cutoff_subtracts_days() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("valid timestamp"));
        let window = RetentionWindow::new(3).unwrap_or_else(|_| panic!("valid window"));

        let expected = Utc
            .with_ymd_and_hms(2026, 3, 7, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("valid timestamp"));
        assert!(matches!(window.cutoff(now), Ok(cutoff) if cutoff == expected));
    }

    #[test]
    fn retention_window_serializes_as_plain_days() {
        let window = RetentionWindow::new(7).unwrap_or_else(|_| panic!("valid window"));
        let encoded = serde_json::to_string(&window).unwrap_or_default();
        assert_eq!(encoded, "7");

        let decoded = serde_json::from_str::<RetentionWindow>("0");
        assert!(decoded.is_err());
    }
}
