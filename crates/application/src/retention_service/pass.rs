use ephemail_domain::{CleanupPlan, CleanupSettings, CleanupStep, DeletionRule, PlannedAction};
use tracing::{debug, info, warn};

use super::{CleanupReport, RetentionService, StepOutcome};

impl RetentionService {
    /// Runs one full pass: relay ping, settings load, then every planned sweep.
    ///
    /// No step aborts the pass. Each step's outcome is recorded in the
    /// returned report.
    pub async fn run_pass(&self) -> CleanupReport {
        let mut report = CleanupReport::start();
        self.ping_relay(&mut report).await;

        let settings = match self.settings_repository.load_settings().await {
            Ok(Some(settings)) => {
                report.record(
                    CleanupStep::LoadSettings,
                    StepOutcome::Succeeded {
                        affected_rows: None,
                    },
                );
                Some(settings)
            }
            Ok(None) => {
                report.record(
                    CleanupStep::LoadSettings,
                    StepOutcome::Skipped {
                        reason: "no cleanup settings stored".to_owned(),
                    },
                );
                None
            }
            Err(error) => {
                warn!(
                    pass_id = %report.pass_id,
                    error = %error,
                    "failed to load cleanup settings; using defaults"
                );
                report.record(
                    CleanupStep::LoadSettings,
                    StepOutcome::Failed {
                        error: error.to_string(),
                    },
                );
                None
            }
        };

        self.execute_plan(&mut report, settings.as_ref()).await;
        report.finish()
    }

    /// Runs one pass with caller-provided settings instead of loading them.
    pub async fn execute_pass(&self, settings: Option<&CleanupSettings>) -> CleanupReport {
        let mut report = CleanupReport::start();
        self.ping_relay(&mut report).await;

        let reason = match settings {
            Some(_) => "settings provided by caller",
            None => "no cleanup settings provided",
        };
        let outcome = StepOutcome::Skipped {
            reason: reason.to_owned(),
        };
        report.record(CleanupStep::LoadSettings, outcome);

        self.execute_plan(&mut report, settings).await;
        report.finish()
    }

    async fn ping_relay(&self, report: &mut CleanupReport) {
        let Some(relay) = self.relay.as_ref() else {
            report.record(
                CleanupStep::RelayPing,
                StepOutcome::Skipped {
                    reason: "relay is not configured".to_owned(),
                },
            );
            return;
        };

        let outcome = match relay.ping().await {
            Ok(()) => {
                debug!(pass_id = %report.pass_id, "relay keep-alive succeeded");
                StepOutcome::Succeeded {
                    affected_rows: None,
                }
            }
            Err(error) => {
                warn!(
                    pass_id = %report.pass_id,
                    error = %error,
                    "relay keep-alive failed"
                );
                StepOutcome::Failed {
                    error: error.to_string(),
                }
            }
        };
        report.record(CleanupStep::RelayPing, outcome);
    }

    async fn execute_plan(&self, report: &mut CleanupReport, settings: Option<&CleanupSettings>) {
        let plan = CleanupPlan::from_settings(settings);

        for entry in plan.entries() {
            let outcome = match &entry.action {
                PlannedAction::Execute(rule) => self.execute_rule(report, rule).await,
                PlannedAction::Skip(reason) => {
                    debug!(
                        pass_id = %report.pass_id,
                        step = %entry.step,
                        reason = %reason,
                        "cleanup step skipped"
                    );
                    StepOutcome::Skipped {
                        reason: reason.clone(),
                    }
                }
                PlannedAction::Reject(error) => {
                    warn!(
                        pass_id = %report.pass_id,
                        step = %entry.step,
                        error = %error,
                        "cleanup step rejected"
                    );
                    StepOutcome::Failed {
                        error: error.clone(),
                    }
                }
            };
            report.record(entry.step.clone(), outcome);
        }
    }

    async fn execute_rule(&self, report: &CleanupReport, rule: &DeletionRule) -> StepOutcome {
        let step = rule.step();

        match self.store.delete(rule).await {
            Ok(affected_rows) => {
                if affected_rows > 0 {
                    info!(
                        pass_id = %report.pass_id,
                        step = %step,
                        affected_rows,
                        "cleanup step deleted records"
                    );
                } else {
                    debug!(
                        pass_id = %report.pass_id,
                        step = %step,
                        "cleanup step found nothing to delete"
                    );
                }
                StepOutcome::Succeeded {
                    affected_rows: Some(affected_rows),
                }
            }
            Err(error) => {
                match rule {
                    DeletionRule::Custom(custom) => warn!(
                        pass_id = %report.pass_id,
                        rule_name = %custom.name,
                        error = %error,
                        "custom cleanup rule failed"
                    ),
                    DeletionRule::Category { .. } => warn!(
                        pass_id = %report.pass_id,
                        step = %step,
                        error = %error,
                        "cleanup sweep failed"
                    ),
                }
                StepOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }
}
