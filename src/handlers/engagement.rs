// Like and comment handlers.

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
    utils::{ApiError, ApiResponse},
};

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentRequest {
    pub post_id: Uuid,
    pub comment: String,
}

/// GET /like/{post_id}/ - Like a post; duplicates surface as Conflict
pub async fn like_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(post_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ApiError> {
    let like = state
        .engagement_service
        .like_post(caller.base_user_id, caller.is_admin(), post_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(serde_json::json!({
            "id": like.id,
            "post_id": like.post_id,
        }))),
    ))
}

/// DELETE /like/{post_id}/ - Remove the caller's like; silent no-op
pub async fn unlike_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .engagement_service
        .unlike_post(caller.base_user_id, post_id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Like removed!",
        serde_json::json!({}),
    )))
}

/// POST /comment/ - Comment on a post
pub async fn create_comment(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ApiError> {
    let comment = state
        .engagement_service
        .comment_on_post(
            caller.base_user_id,
            caller.is_admin(),
            req.post_id,
            &req.comment,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(serde_json::json!({
            "id": comment.id,
            "post_id": comment.post_id,
            "comment": comment.comment,
        }))),
    ))
}

/// DELETE /comment/{id}/ - Author-only comment deletion
pub async fn delete_comment(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .engagement_service
        .delete_comment(caller.base_user_id, id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Comment deleted!",
        serde_json::json!({}),
    )))
}
