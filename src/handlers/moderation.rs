// Report and moderation handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::{ReportReason, ReportedPost},
    utils::{error_strings, ApiError, ApiResponse},
};

#[derive(Debug, Deserialize, Serialize)]
pub struct ReportPostRequest {
    pub reason: ReportReason,
    pub additional_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportData {
    pub id: Uuid,
    pub post_id: Uuid,
    pub reported_by: Uuid,
    pub reason: String,
    pub additional_text: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReportedPost> for ReportData {
    fn from(report: ReportedPost) -> Self {
        Self {
            id: report.id,
            post_id: report.post_id,
            reported_by: report.reported_by,
            reason: report.reason,
            additional_text: report.additional_text,
            created_at: report.created_at,
        }
    }
}

/// POST /report-post/{post_id}/ - Report a post
pub async fn report_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(post_id): Path<Uuid>,
    Json(req): Json<ReportPostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReportData>>), ApiError> {
    let report = state
        .moderation_service
        .report_post(caller.base_user_id, post_id, req.reason, req.additional_text)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ReportData::from(report))),
    ))
}

/// GET /admin/reported_posts/ - All reports, admin-only
pub async fn list_reported_posts(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<ReportData>>>, ApiError> {
    if !caller.is_admin() {
        return Err(ApiError::forbidden(error_strings::NO_PERMISSION));
    }

    let reports = state.moderation_service.list_reports().await?;
    Ok(Json(ApiResponse::new(
        reports.into_iter().map(ReportData::from).collect(),
    )))
}

/// DELETE /admin/reported_posts/{post_id}/ - Remove a reported post and
/// notify its author
pub async fn delete_reported_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !caller.is_admin() {
        return Err(ApiError::forbidden(error_strings::NO_PERMISSION));
    }

    state.post_service.admin_delete_post(post_id).await?;
    Ok(Json(ApiResponse::with_message(
        "Post deleted!",
        serde_json::json!({}),
    )))
}
