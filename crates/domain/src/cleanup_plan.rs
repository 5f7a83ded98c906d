use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{CleanupCategory, CleanupSettings, CustomCleanupRule, RetentionWindow};

/// One unit of work in a cleanup pass, as reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CleanupStep {
    /// Keep-alive ping to the notification relay.
    RelayPing,
    /// Loading the cleanup settings document.
    LoadSettings,
    /// Built-in category sweep.
    Sweep {
        /// Swept category.
        category: CleanupCategory,
        /// Effective window; absent when none could be derived.
        retention_days: Option<u32>,
    },
    /// Named custom rule.
    CustomRule {
        /// Rule name as configured.
        name: String,
    },
}

impl Display for CleanupStep {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelayPing => formatter.write_str("relay_ping"),
            Self::LoadSettings => formatter.write_str("load_settings"),
            Self::Sweep { category, .. } => write!(formatter, "sweep:{category}"),
            Self::CustomRule { name } => write!(formatter, "custom:{name}"),
        }
    }
}

/// Deletion executed through the retention store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeletionRule {
    /// Built-in age-based sweep.
    Category {
        /// Swept category.
        category: CleanupCategory,
        /// Age threshold.
        window: RetentionWindow,
    },
    /// Operator-defined rule.
    Custom(CustomCleanupRule),
}

impl DeletionRule {
    /// Creates a built-in category sweep.
    #[must_use]
    pub fn sweep(category: CleanupCategory, window: RetentionWindow) -> Self {
        Self::Category { category, window }
    }

    /// Returns the report step this rule corresponds to.
    #[must_use]
    pub fn step(&self) -> CleanupStep {
        match self {
            Self::Category { category, window } => CleanupStep::Sweep {
                category: *category,
                retention_days: Some(window.days()),
            },
            Self::Custom(rule) => CleanupStep::CustomRule {
                name: rule.name.clone(),
            },
        }
    }
}

/// What the pass does with a planned step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    /// Execute the deletion.
    Execute(DeletionRule),
    /// Do not execute; not an error.
    Skip(String),
    /// Do not execute; report as a failure.
    Reject(String),
}

/// Planned step with its action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDeletion {
    /// Step reported for this entry.
    pub step: CleanupStep,
    /// Action to take.
    pub action: PlannedAction,
}

/// Ordered deletions derived from the cleanup settings of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPlan {
    entries: Vec<PlannedDeletion>,
}

impl CleanupPlan {
    /// Derives the plan for a pass.
    ///
    /// Mandatory sweeps are always planned. Optional sweeps and custom rules
    /// are only considered when settings are present. A custom rule reusing
    /// an earlier rule's name is rejected.
    #[must_use]
    pub fn from_settings(settings: Option<&CleanupSettings>) -> Self {
        let mut entries = Vec::new();

        for category in CleanupCategory::MANDATORY {
            let window = settings
                .map(|settings| settings.mandatory_window(category))
                .unwrap_or_else(RetentionWindow::fallback);
            let rule = DeletionRule::sweep(category, window);
            entries.push(PlannedDeletion {
                step: rule.step(),
                action: PlannedAction::Execute(rule),
            });
        }

        let Some(settings) = settings else {
            return Self { entries };
        };

        for category in CleanupCategory::OPTIONAL {
            let setting = settings.category_setting(category);
            if !setting.enabled {
                continue;
            }

            let entry = match setting.days.map(RetentionWindow::new) {
                Some(Ok(window)) => {
                    let rule = DeletionRule::sweep(category, window);
                    PlannedDeletion {
                        step: rule.step(),
                        action: PlannedAction::Execute(rule),
                    }
                }
                Some(Err(error)) => PlannedDeletion {
                    step: CleanupStep::Sweep {
                        category,
                        retention_days: None,
                    },
                    action: PlannedAction::Reject(error.to_string()),
                },
                None => PlannedDeletion {
                    step: CleanupStep::Sweep {
                        category,
                        retention_days: None,
                    },
                    action: PlannedAction::Reject(format!(
                        "cleanup for '{category}' is enabled but has no retention days"
                    )),
                },
            };
            entries.push(entry);
        }

        let mut seen_names = HashSet::new();
        for rule in &settings.custom_cleanup_rules {
            let name = rule.name.trim();
            if !name.is_empty() && !seen_names.insert(name) {
                entries.push(PlannedDeletion {
                    step: CleanupStep::CustomRule {
                        name: rule.name.clone(),
                    },
                    action: PlannedAction::Reject(format!(
                        "duplicate custom cleanup rule name '{name}'"
                    )),
                });
                continue;
            }

            entries.push(plan_custom_rule(rule));
        }

        Self { entries }
    }

    /// Returns the planned entries in execution order.
    #[must_use]
    pub fn entries(&self) -> &[PlannedDeletion] {
        self.entries.as_slice()
    }

    /// Returns the rules that will be executed, in order.
    pub fn runnable_rules(&self) -> impl Iterator<Item = &DeletionRule> {
        self.entries.iter().filter_map(|entry| match &entry.action {
            PlannedAction::Execute(rule) => Some(rule),
            PlannedAction::Skip(_) | PlannedAction::Reject(_) => None,
        })
    }
}

fn plan_custom_rule(rule: &CustomCleanupRule) -> PlannedDeletion {
    let step = CleanupStep::CustomRule {
        name: rule.name.clone(),
    };

    let action = if !rule.enabled {
        PlannedAction::Skip("rule is disabled".to_owned())
    } else if rule.filter.is_empty() {
        PlannedAction::Skip("rule has no deletion conditions".to_owned())
    } else if rule.name.trim().is_empty() {
        PlannedAction::Reject("custom cleanup rule name must not be empty".to_owned())
    } else if let Err(error) = rule.filter.validate() {
        PlannedAction::Reject(error.to_string())
    } else {
        PlannedAction::Execute(DeletionRule::Custom(rule.clone()))
    };

    PlannedDeletion { step, action }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use super::{CleanupPlan, CleanupStep, DeletionRule, PlannedAction};
    use crate::{
        CleanupCategory, CleanupFilter, CleanupSettings, CustomCleanupRule, MAX_RETENTION_DAYS,
    };

    fn sweeps(plan: &CleanupPlan) -> Vec<(CleanupCategory, u32)> {
        plan.runnable_rules()
            .filter_map(|rule| match rule {
                DeletionRule::Category { category, window } => Some((*category, window.days())),
                DeletionRule::Custom(_) => None,
            })
            .collect()
    }

    #[test]
    fn absent_settings_plan_four_default_sweeps() {
        let plan = CleanupPlan::from_settings(None);

        assert_eq!(
            sweeps(&plan),
            vec![
                (CleanupCategory::Mails, 1),
                (CleanupCategory::UnroutedMails, 1),
                (CleanupCategory::Sendbox, 1),
                (CleanupCategory::AddressByCreation, 1),
            ]
        );
        assert_eq!(plan.entries().len(), 4);
    }

    #[test]
    fn mail_and_inactive_override_scenario() {
        let settings = CleanupSettings::default()
            .with_category(CleanupCategory::Mails, true, Some(3))
            .with_category(CleanupCategory::InactiveAddress, true, Some(7));

        let plan = CleanupPlan::from_settings(Some(&settings));

        assert_eq!(
            sweeps(&plan),
            vec![
                (CleanupCategory::Mails, 3),
                (CleanupCategory::UnroutedMails, 1),
                (CleanupCategory::Sendbox, 1),
                (CleanupCategory::AddressByCreation, 1),
                (CleanupCategory::InactiveAddress, 7),
            ]
        );
    }

    #[test]
    fn enabled_optional_category_without_days_is_rejected() {
        let settings =
            CleanupSettings::default().with_category(CleanupCategory::EmptyAddress, true, None);

        let plan = CleanupPlan::from_settings(Some(&settings));

        assert_eq!(sweeps(&plan).len(), 4);
        assert!(
            plan.entries()
                .iter()
                .any(|entry| matches!(entry.action, PlannedAction::Reject(_)))
        );
    }

    #[test]
    fn disabled_and_empty_custom_rules_are_skipped() {
        let filter = CleanupFilter {
            older_than_days: Some(2),
            ..CleanupFilter::default()
        };
        let settings = CleanupSettings::default()
            .with_custom_rule(CustomCleanupRule::new("off", false, filter.clone()))
            .with_custom_rule(CustomCleanupRule::new(
                "no-logic",
                true,
                CleanupFilter::default(),
            ))
            .with_custom_rule(CustomCleanupRule::new("on", true, filter));

        let plan = CleanupPlan::from_settings(Some(&settings));
        let custom_names = plan
            .runnable_rules()
            .filter_map(|rule| match rule {
                DeletionRule::Custom(rule) => Some(rule.name.as_str()),
                DeletionRule::Category { .. } => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(custom_names, vec!["on"]);
        let skipped = plan
            .entries()
            .iter()
            .filter(|entry| matches!(entry.action, PlannedAction::Skip(_)))
            .count();
        assert_eq!(skipped, 2);
    }

    #[test]
    fn duplicate_custom_rule_names_are_rejected_after_the_first() {
        let filter = CleanupFilter {
            older_than_days: Some(2),
            ..CleanupFilter::default()
        };
        let settings = CleanupSettings::default()
            .with_custom_rule(CustomCleanupRule::new("spam", true, filter.clone()))
            .with_custom_rule(CustomCleanupRule::new(" spam", true, filter.clone()))
            .with_custom_rule(CustomCleanupRule::new("other", true, filter));

        let plan = CleanupPlan::from_settings(Some(&settings));
        let custom = plan
            .entries()
            .iter()
            .filter(|entry| matches!(entry.step, CleanupStep::CustomRule { .. }))
            .collect::<Vec<_>>();

        assert_eq!(custom.len(), 3);
        assert!(matches!(custom[0].action, PlannedAction::Execute(_)));
        assert!(matches!(custom[1].action, PlannedAction::Reject(_)));
        assert!(matches!(custom[2].action, PlannedAction::Execute(_)));
    }

    #[test]
    fn oversized_days_fall_back_or_reject() {
        let settings = CleanupSettings::default()
            .with_category(CleanupCategory::Mails, true, Some(100_000_000))
            .with_category(CleanupCategory::EmptyAddress, true, Some(i64::MAX));

        let plan = CleanupPlan::from_settings(Some(&settings));

        assert_eq!(sweeps(&plan)[0], (CleanupCategory::Mails, 1));
        assert_eq!(sweeps(&plan).len(), 4);
        assert!(
            plan.entries()
                .iter()
                .any(|entry| matches!(entry.action, PlannedAction::Reject(_)))
        );
        assert!(settings.validate().is_err());
    }

    fn arbitrary_days() -> impl Strategy<Value = i64> {
        let max = i64::from(MAX_RETENTION_DAYS);
        prop_oneof![
            any::<i64>(),
            -5_i64..60,
            (max - 10)..(max + 10),
            Just(i64::MAX),
            Just(i64::MIN),
        ]
    }

    fn arbitrary_settings() -> impl Strategy<Value = CleanupSettings> {
        let category_values =
            prop::collection::vec((any::<bool>(), prop::option::of(arbitrary_days())), 7);
        category_values.prop_map(|values| {
            CleanupCategory::all().into_iter().zip(values).fold(
                CleanupSettings::default(),
                |settings, (category, (enabled, days))| {
                    settings.with_category(category, enabled, days)
                },
            )
        })
    }

    proptest! {
        #[test]
        fn mandatory_categories_are_always_swept_first(settings in arbitrary_settings()) {
            let plan = CleanupPlan::from_settings(Some(&settings));
            let planned = sweeps(&plan);

            prop_assert!(planned.len() >= 4);
            for (index, category) in CleanupCategory::MANDATORY.into_iter().enumerate() {
                prop_assert_eq!(planned[index].0, category);
                prop_assert!(planned[index].1 >= 1);
            }
        }

        #[test]
        fn disabled_mandatory_flags_always_use_one_day(days in prop::option::of(arbitrary_days())) {
            let settings = CleanupCategory::MANDATORY.into_iter().fold(
                CleanupSettings::default(),
                |settings, category| settings.with_category(category, false, days),
            );
            let plan = CleanupPlan::from_settings(Some(&settings));

            prop_assert!(sweeps(&plan).iter().all(|(_, days)| *days == 1));
        }

        #[test]
        fn optional_sweep_happens_iff_enabled_with_valid_days(settings in arbitrary_settings()) {
            let plan = CleanupPlan::from_settings(Some(&settings));
            let planned = sweeps(&plan);

            for category in CleanupCategory::OPTIONAL {
                let setting = settings.category_setting(category);
                let expected = setting
                    .configured_window()
                    .map(|window| (category, window.days()));
                let found = planned.iter().copied().find(|(swept, _)| *swept == category);
                prop_assert_eq!(found, expected);
            }
        }

        #[test]
        fn planned_windows_always_yield_a_cutoff(settings in arbitrary_settings()) {
            let plan = CleanupPlan::from_settings(Some(&settings));
            let now = Utc::now();

            for rule in plan.runnable_rules() {
                if let DeletionRule::Category { window, .. } = rule {
                    prop_assert!(window.days() >= 1);
                    prop_assert!(window.days() <= MAX_RETENTION_DAYS);
                    prop_assert!(window.cutoff(now).is_ok());
                }
            }
        }

        #[test]
        fn out_of_range_enabled_days_fail_validation(settings in arbitrary_settings()) {
            let out_of_range = CleanupCategory::all().into_iter().any(|category| {
                let setting = settings.category_setting(category);
                setting.enabled
                    && !setting
                        .days
                        .is_some_and(|days| (1..=i64::from(MAX_RETENTION_DAYS)).contains(&days))
            });

            prop_assert_eq!(settings.validate().is_err(), out_of_range);
        }
    }
}
