use chrono::{DateTime, Utc};
use ephemail_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::RetentionWindow;

/// Maximum length of a string condition in a custom filter.
pub const MAX_FILTER_PATTERN_LENGTH: usize = 256;

/// Table a custom cleanup rule deletes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupTarget {
    /// Inbound mails.
    #[default]
    Mails,
    /// Outbound sendbox records.
    Sendbox,
    /// Address records.
    Address,
}

impl CleanupTarget {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mails => "mails",
            Self::Sendbox => "sendbox",
            Self::Address => "address",
        }
    }

    /// Returns whether records of this target carry raw message content.
    #[must_use]
    pub fn has_raw_content(&self) -> bool {
        !matches!(self, Self::Address)
    }
}

/// Declarative deletion predicate for a custom cleanup rule.
///
/// All present conditions must hold for a record to be deleted. A filter with
/// no condition at all carries no deletion logic and is never executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleanupFilter {
    /// Table the rule deletes from.
    pub target: CleanupTarget,
    /// Only records older than this many days.
    pub older_than_days: Option<i64>,
    /// Only records whose address starts with this literal.
    pub address_prefix: Option<String>,
    /// Only records whose address ends with this literal.
    pub address_suffix: Option<String>,
    /// Only records whose raw content contains this literal.
    pub raw_contains: Option<String>,
}

impl CleanupFilter {
    /// Returns whether the filter has no condition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.older_than_days.is_none()
            && self.address_prefix.is_none()
            && self.address_suffix.is_none()
            && self.raw_contains.is_none()
    }

    /// Validates every present condition.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(days) = self.older_than_days {
            RetentionWindow::new(days)?;
        }

        validate_pattern("addressPrefix", self.address_prefix.as_deref())?;
        validate_pattern("addressSuffix", self.address_suffix.as_deref())?;
        validate_pattern("rawContains", self.raw_contains.as_deref())?;

        if self.raw_contains.is_some() && !self.target.has_raw_content() {
            return Err(AppError::Validation(format!(
                "rawContains is not supported for target '{}'",
                self.target.as_str()
            )));
        }

        Ok(())
    }

    /// Returns the age window, when the filter constrains age.
    #[must_use]
    pub fn window(&self) -> Option<RetentionWindow> {
        self.older_than_days
            .and_then(|days| RetentionWindow::new(days).ok())
    }

    /// Evaluates the filter against one record.
    ///
    /// `raw` is ignored for targets without raw content.
    #[must_use]
    pub fn matches(
        &self,
        address: &str,
        raw: Option<&str>,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.is_empty() {
            return false;
        }

        if let Some(window) = self.window() {
            match window.cutoff(now) {
                Ok(cutoff) if created_at < cutoff => {}
                Ok(_) | Err(_) => return false,
            }
        }

        if let Some(prefix) = self.address_prefix.as_deref()
            && !address.starts_with(prefix)
        {
            return false;
        }

        if let Some(suffix) = self.address_suffix.as_deref()
            && !address.ends_with(suffix)
        {
            return false;
        }

        match (self.raw_contains.as_deref(), raw) {
            (Some(needle), Some(raw)) => raw.contains(needle),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

fn validate_pattern(field: &str, value: Option<&str>) -> AppResult<()> {
    let Some(value) = value else {
        return Ok(());
    };

    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be blank")));
    }

    if value.chars().count() > MAX_FILTER_PATTERN_LENGTH {
        return Err(AppError::Validation(format!(
            "{field} must not exceed {MAX_FILTER_PATTERN_LENGTH} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{CleanupFilter, CleanupTarget};

    #[test]
    fn default_filter_is_empty_and_matches_nothing() {
        let filter = CleanupFilter::default();
        let now = Utc::now();

        assert!(filter.is_empty());
        assert!(!filter.matches("a@example.com", Some("body"), now - Duration::days(90), now));
    }

    #[test]
    fn conditions_are_conjunctive() {
        let now = Utc::now();
        let filter = CleanupFilter {
            target: CleanupTarget::Mails,
            older_than_days: Some(2),
            address_suffix: Some("@spam.example".to_owned()),
            ..CleanupFilter::default()
        };

        let old = now - Duration::days(3);
        let fresh = now - Duration::hours(6);
        assert!(filter.matches("x@spam.example", None, old, now));
        assert!(!filter.matches("x@spam.example", None, fresh, now));
        assert!(!filter.matches("x@ham.example", None, old, now));
    }

    #[test]
    fn raw_condition_requires_raw_content() {
        let now = Utc::now();
        let filter = CleanupFilter {
            raw_contains: Some("X-Spam-Flag: YES".to_owned()),
            ..CleanupFilter::default()
        };

        assert!(filter.matches("a@example.com", Some("X-Spam-Flag: YES\r\n"), now, now));
        assert!(!filter.matches("a@example.com", None, now, now));
    }

    #[test]
    fn validation_rejects_blank_patterns_and_bad_windows() {
        let blank = CleanupFilter {
            address_prefix: Some("  ".to_owned()),
            ..CleanupFilter::default()
        };
        assert!(blank.validate().is_err());

        let zero_days = CleanupFilter {
            older_than_days: Some(0),
            ..CleanupFilter::default()
        };
        assert!(zero_days.validate().is_err());

        let raw_on_address = CleanupFilter {
            target: CleanupTarget::Address,
            raw_contains: Some("hello".to_owned()),
            ..CleanupFilter::default()
        };
        assert!(raw_on_address.validate().is_err());
    }

    #[test]
    fn filter_deserializes_from_camel_case_document() {
        let filter = serde_json::from_str::<CleanupFilter>(
            r#"{"target":"sendbox","olderThanDays":5,"addressPrefix":"bot-"}"#,
        )
        .unwrap_or_default();

        assert_eq!(filter.target, CleanupTarget::Sendbox);
        assert_eq!(filter.older_than_days, Some(5));
        assert_eq!(filter.address_prefix.as_deref(), Some("bot-"));
        assert!(filter.validate().is_ok());
    }
}
