use std::str::FromStr;

use axum::Json;
use axum::extract::State;
use ephemail_domain::{CleanupCategory, CleanupSettings};
use tracing::info;

use crate::dto::{
    CleanupReportResponse, CleanupSettingsResponse, ManualCleanupRequest, ManualCleanupResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[cfg(test)]
mod tests;

pub async fn get_cleanup_settings_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<CleanupSettingsResponse>> {
    let settings = state.retention_service.load_settings().await?;

    Ok(Json(CleanupSettingsResponse::from_stored(settings)))
}

pub async fn save_cleanup_settings_handler(
    State(state): State<AppState>,
    Json(payload): Json<CleanupSettings>,
) -> ApiResult<Json<CleanupSettingsResponse>> {
    let saved = state.retention_service.save_settings(payload).await?;

    Ok(Json(CleanupSettingsResponse::from_stored(Some(saved))))
}

pub async fn manual_cleanup_handler(
    State(state): State<AppState>,
    Json(payload): Json<ManualCleanupRequest>,
) -> ApiResult<Json<ManualCleanupResponse>> {
    let category = CleanupCategory::from_str(payload.clean_type.trim())?;
    let deleted = state
        .retention_service
        .cleanup_now(category, payload.clean_days)
        .await?;

    Ok(Json(ManualCleanupResponse { deleted }))
}

pub async fn run_cleanup_pass_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<CleanupReportResponse>> {
    let report = state.retention_service.run_pass().await;
    info!(
        pass_id = %report.pass_id,
        deleted_rows = report.deleted_rows(),
        failed_steps = report.failures().count(),
        "manual cleanup pass finished"
    );

    Ok(Json(CleanupReportResponse::from(report)))
}
