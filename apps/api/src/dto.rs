use ephemail_application::{CleanupReport, StepOutcome};
use ephemail_domain::CleanupSettings;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "health-response.ts")]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
    pub redis: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "health-dependency-status.ts")]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Stored cleanup settings, or defaults when nothing is stored yet.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "cleanup-settings-response.ts")]
pub struct CleanupSettingsResponse {
    pub configured: bool,
    #[ts(type = "Record<string, unknown>")]
    pub settings: CleanupSettings,
}

impl CleanupSettingsResponse {
    /// Builds the response from an optional stored document.
    #[must_use]
    pub fn from_stored(settings: Option<CleanupSettings>) -> Self {
        Self {
            configured: settings.is_some(),
            settings: settings.unwrap_or_default(),
        }
    }
}

/// Manual one-category sweep request.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "manual-cleanup-request.ts")]
pub struct ManualCleanupRequest {
    /// Category storage identifier, for example `mails` or `inactive_address`.
    pub clean_type: String,
    /// Retention window in days; must be at least one.
    #[ts(type = "number")]
    pub clean_days: i64,
}

/// Manual sweep result.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "manual-cleanup-response.ts")]
pub struct ManualCleanupResponse {
    #[ts(type = "number")]
    pub deleted: u64,
}

/// One step of a cleanup pass.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "cleanup-step-response.ts")]
pub struct CleanupStepResponse {
    pub step: String,
    #[ts(type = "\"succeeded\" | \"skipped\" | \"failed\"")]
    pub status: &'static str,
    #[ts(type = "number | null")]
    pub affected_rows: Option<u64>,
    pub reason: Option<String>,
    pub error: Option<String>,
}

/// Result of a full cleanup pass.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "cleanup-report-response.ts")]
pub struct CleanupReportResponse {
    pub pass_id: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    #[ts(type = "number")]
    pub deleted_rows: u64,
    pub failed_steps: usize,
    pub steps: Vec<CleanupStepResponse>,
}

impl From<CleanupReport> for CleanupReportResponse {
    fn from(report: CleanupReport) -> Self {
        let deleted_rows = report.deleted_rows();
        let failed_steps = report.failures().count();

        Self {
            pass_id: report.pass_id.to_string(),
            started_at: report.started_at.to_rfc3339(),
            finished_at: report.finished_at.map(|value| value.to_rfc3339()),
            deleted_rows,
            failed_steps,
            steps: report
                .steps
                .into_iter()
                .map(|entry| {
                    let step = entry.step.to_string();
                    match entry.outcome {
                        StepOutcome::Succeeded { affected_rows } => CleanupStepResponse {
                            step,
                            status: "succeeded",
                            affected_rows,
                            reason: None,
                            error: None,
                        },
                        StepOutcome::Skipped { reason } => CleanupStepResponse {
                            step,
                            status: "skipped",
                            affected_rows: None,
                            reason: Some(reason),
                            error: None,
                        },
                        StepOutcome::Failed { error } => CleanupStepResponse {
                            step,
                            status: "failed",
                            affected_rows: None,
                            reason: None,
                            error: Some(error),
                        },
                    }
                })
                .collect(),
        }
    }
}
