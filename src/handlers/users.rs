// Profile and account handlers: profile viewing/updating/deletion, the
// identity record, and the admin marker endpoints.

use axum::{
    extract::{Multipart, Path, State},
    response::Json,
};
use serde::Serialize;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::User,
    services::ProfileUpdate,
    utils::{error_strings, ApiError, ApiResponse},
};

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub username: String,
    pub bio: Option<String>,
    pub profile_type: String,
    pub profile_image_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct BaseUserData {
    pub id: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

pub(crate) fn profile_data(state: &AppState, user: &User) -> ProfileData {
    ProfileData {
        username: user.username.clone(),
        bio: user.bio.clone(),
        profile_type: user.profile_type.clone(),
        profile_image_url: state.profile_service.avatar_url(user),
        created_at: user.created_at,
    }
}

/// GET /user/ - The caller's own profile
pub async fn get_own_profile(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    let user = state
        .profile_service
        .get_own_profile(caller.base_user_id)
        .await?;
    Ok(Json(ApiResponse::new(profile_data(&state, &user))))
}

/// GET /user/{username}/ - Public profile view
pub async fn get_user(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    let user = state.profile_service.get_by_username(&username).await?;
    Ok(Json(ApiResponse::new(profile_data(&state, &user))))
}

/// GET /users/ - Username directory
pub async fn list_users(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let usernames = state.profile_service.list_usernames().await?;
    Ok(Json(ApiResponse::new(usernames)))
}

/// PUT /user/ - Update the caller's profile (multipart, optional avatar)
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    let mut update = ProfileUpdate::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("username") => {
                update.username = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            },
            Some("bio") => {
                update.bio = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            },
            Some("profile_type") => {
                update.profile_type = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            },
            Some("profile") => {
                let content_type = field
                    .content_type()
                    .map(|ct| ct.to_string())
                    .unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                update.avatar = Some((content_type, bytes.to_vec()));
            },
            _ => {},
        }
    }

    let user = state
        .profile_service
        .update_profile(caller.base_user_id, update)
        .await?;
    Ok(Json(ApiResponse::new(profile_data(&state, &user))))
}

/// DELETE /user/ - Delete the caller's profile
pub async fn delete_profile(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .profile_service
        .delete_profile(caller.base_user_id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "User deleted!",
        serde_json::json!({}),
    )))
}

/// GET /base-user/ - The caller's identity record
pub async fn get_base_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<BaseUserData>>, ApiError> {
    let base_user = state
        .profile_service
        .get_base_user(caller.base_user_id)
        .await?;
    Ok(Json(ApiResponse::new(BaseUserData {
        id: base_user.id.to_string(),
        email: base_user.email,
        role: base_user.role,
        is_active: base_user.is_active,
    })))
}

/// DELETE /base-user/ - Delete the whole account
pub async fn delete_account(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .profile_service
        .delete_account(caller.base_user_id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Account deleted!",
        serde_json::json!({}),
    )))
}

/// GET /admin/ - The caller's admin marker row
pub async fn get_admin(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !caller.is_admin() {
        return Err(ApiError::forbidden(error_strings::NO_PERMISSION));
    }

    let admin = state.profile_service.get_admin(caller.base_user_id).await?;
    Ok(Json(ApiResponse::new(serde_json::json!({
        "id": admin.id,
        "base_user_id": admin.base_user_id,
        "created_at": admin.created_at,
    }))))
}

/// DELETE /admin/ - Remove the caller's admin marker
pub async fn delete_admin(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !caller.is_admin() {
        return Err(ApiError::forbidden(error_strings::NO_PERMISSION));
    }

    state
        .profile_service
        .delete_admin(caller.base_user_id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Admin deleted!",
        serde_json::json!({}),
    )))
}
