// Follow graph handlers: request lifecycle plus follower/following listings.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::User,
    utils::{ApiError, ApiResponse},
};

#[derive(Debug, Deserialize, Serialize)]
pub struct FollowUsernameRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub username: String,
    pub bio: Option<String>,
    pub profile_type: String,
}

fn summaries(users: Vec<User>) -> Vec<ProfileSummary> {
    users
        .into_iter()
        .map(|u| ProfileSummary {
            username: u.username,
            bio: u.bio,
            profile_type: u.profile_type,
        })
        .collect()
}

/// POST /follow/send/ - Follow a public profile or request a private one
pub async fn send_request(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(req): Json<FollowUsernameRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ApiError> {
    let edge = state
        .follow_service
        .send_request(caller.base_user_id, &req.username)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(serde_json::json!({
            "username": req.username,
            "status": edge.status,
        }))),
    ))
}

/// POST /follow/accept/ - Accept a pending request sent to the caller
pub async fn accept_request(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(req): Json<FollowUsernameRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let edge = state
        .follow_service
        .accept_request(caller.base_user_id, &req.username)
        .await?;

    Ok(Json(ApiResponse::new(serde_json::json!({
        "username": req.username,
        "status": edge.status,
    }))))
}

/// POST /follow/reject/ - Reject a pending request sent to the caller
pub async fn reject_request(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(req): Json<FollowUsernameRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .follow_service
        .reject_request(caller.base_user_id, &req.username)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Request rejected!",
        serde_json::json!({}),
    )))
}

/// POST /follow/cancel/ - Cancel a pending request the caller sent
pub async fn cancel_request(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(req): Json<FollowUsernameRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .follow_service
        .cancel_request(caller.base_user_id, &req.username)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Request cancelled!",
        serde_json::json!({}),
    )))
}

/// POST /follow/unfollow/ - Remove an approved outgoing edge
pub async fn unfollow(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(req): Json<FollowUsernameRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .follow_service
        .unfollow(caller.base_user_id, &req.username)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Unfollowed!",
        serde_json::json!({}),
    )))
}

/// POST /follow/remove-follower/ - Remove an approved incoming edge
pub async fn remove_follower(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(req): Json<FollowUsernameRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .follow_service
        .remove_follower(caller.base_user_id, &req.username)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Follower removed!",
        serde_json::json!({}),
    )))
}

/// GET /follow-requests/received/ - Pending requests sent to the caller
pub async fn requests_received(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<ProfileSummary>>>, ApiError> {
    let profiles = state
        .follow_service
        .pending_received(caller.base_user_id)
        .await?;
    Ok(Json(ApiResponse::new(summaries(profiles))))
}

/// GET /follow-requests/sent/ - Pending requests the caller has sent
pub async fn requests_sent(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<ProfileSummary>>>, ApiError> {
    let profiles = state
        .follow_service
        .pending_sent(caller.base_user_id)
        .await?;
    Ok(Json(ApiResponse::new(summaries(profiles))))
}

/// GET /followers/{username}/ - Approved followers, visibility-gated
pub async fn followers(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<ProfileSummary>>>, ApiError> {
    let profiles = state
        .follow_service
        .followers_of(caller.base_user_id, caller.is_admin(), &username)
        .await?;
    Ok(Json(ApiResponse::new(summaries(profiles))))
}

/// GET /following/{username}/ - Approved following list, visibility-gated
pub async fn following(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<ProfileSummary>>>, ApiError> {
    let profiles = state
        .follow_service
        .following_of(caller.base_user_id, caller.is_admin(), &username)
        .await?;
    Ok(Json(ApiResponse::new(summaries(profiles))))
}
