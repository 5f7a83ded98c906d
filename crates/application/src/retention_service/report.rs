use chrono::{DateTime, Utc};
use ephemail_domain::CleanupStep;
use serde::Serialize;
use uuid::Uuid;

/// Result of one step of a cleanup pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step completed; deletions report the number of removed rows.
    Succeeded {
        /// Rows removed by the step, for deletion steps.
        affected_rows: Option<u64>,
    },
    /// Step was intentionally not executed.
    Skipped {
        /// Why the step did not run.
        reason: String,
    },
    /// Step failed; the pass continued.
    Failed {
        /// Failure description.
        error: String,
    },
}

impl StepOutcome {
    /// Returns whether the step failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One `{step, outcome}` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupStepReport {
    /// Step identity.
    pub step: CleanupStep,
    /// Step outcome.
    pub outcome: StepOutcome,
}

/// Per-step results of one cleanup pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Correlation identifier for log lines of this pass.
    pub pass_id: Uuid,
    /// Pass start time.
    pub started_at: DateTime<Utc>,
    /// Pass completion time.
    pub finished_at: Option<DateTime<Utc>>,
    /// Step results in execution order.
    pub steps: Vec<CleanupStepReport>,
}

impl CleanupReport {
    pub(super) fn start() -> Self {
        Self {
            pass_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    pub(super) fn record(&mut self, step: CleanupStep, outcome: StepOutcome) {
        self.steps.push(CleanupStepReport { step, outcome });
    }

    pub(super) fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// Returns the outcome of the first step equal to `step`.
    #[must_use]
    pub fn outcome_of(&self, step: &CleanupStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|entry| &entry.step == step)
            .map(|entry| &entry.outcome)
    }

    /// Returns the failed steps.
    pub fn failures(&self) -> impl Iterator<Item = &CleanupStepReport> {
        self.steps.iter().filter(|entry| entry.outcome.is_failure())
    }

    /// Returns the total number of rows removed during the pass.
    #[must_use]
    pub fn deleted_rows(&self) -> u64 {
        self.steps
            .iter()
            .filter_map(|entry| match entry.outcome {
                StepOutcome::Succeeded { affected_rows } => affected_rows,
                StepOutcome::Skipped { .. } | StepOutcome::Failed { .. } => None,
            })
            .sum()
    }
}
