// Post handlers: multipart creation (plain and ad), visibility-gated
// listing with search/date filters, feed, owner update and delete.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::{CreatedWithin, PostFilter},
    services::PostWithMedia,
    utils::{error_strings, ApiError, ApiResponse, Page},
};

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub created: Option<CreatedWithin>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdatePostRequest {
    pub caption: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MediaData {
    pub id: Uuid,
    pub media_type: String,
    pub media_url: String,
}

#[derive(Debug, Serialize)]
pub struct PostData {
    pub id: Uuid,
    pub posted_by: Uuid,
    pub caption: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub media: Vec<MediaData>,
}

pub(crate) fn post_data(state: &AppState, item: PostWithMedia) -> PostData {
    let media = item
        .media
        .iter()
        .map(|m| MediaData {
            id: m.id,
            media_type: m.media_type.clone(),
            media_url: state.post_service.media_url(m),
        })
        .collect();

    PostData {
        id: item.post.id,
        posted_by: item.post.posted_by,
        caption: item.post.caption,
        created_at: item.post.created_at,
        media,
    }
}

/// Pull the caption and media files out of a multipart body
async fn read_post_multipart(
    mut multipart: Multipart,
) -> Result<(Option<String>, Vec<(String, Vec<u8>)>), ApiError> {
    let mut caption = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("caption") => {
                caption = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            },
            Some("media") => {
                let content_type = field
                    .content_type()
                    .map(|ct| ct.to_string())
                    .unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                files.push((content_type, bytes.to_vec()));
            },
            _ => {},
        }
    }

    Ok((caption, files))
}

/// POST /post/ - Create a post with media. Admin accounts cannot post.
pub async fn create_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<PostData>>), ApiError> {
    if caller.is_admin() {
        return Err(ApiError::forbidden(error_strings::ADMIN_NOT_ALLOWED));
    }

    let (caption, files) = read_post_multipart(multipart).await?;
    let created = state
        .post_service
        .create_post(caller.base_user_id, caption, files)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(post_data(&state, created))),
    ))
}

/// POST /post/ad/ - Create an ad post; requires an active subscription
pub async fn create_ad_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<PostData>>), ApiError> {
    if caller.is_admin() {
        return Err(ApiError::forbidden(error_strings::ADMIN_NOT_ALLOWED));
    }

    state
        .payment_service
        .check_if_user_paid(caller.base_user_id)
        .await?;

    let (caption, files) = read_post_multipart(multipart).await?;
    let created = state
        .post_service
        .create_post(caller.base_user_id, caption, files)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(post_data(&state, created))),
    ))
}

/// GET /posts/{username}/ - List a profile's posts, newest first
pub async fn list_posts(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(username): Path<String>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<ApiResponse<Page<PostData>>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = state.config.pagination.post_page_size;

    let filter = PostFilter {
        search: query.search,
        created_within: query.created,
        page,
        page_size,
    };

    let (items, total) = state
        .post_service
        .list_posts_by_username(caller.base_user_id, caller.is_admin(), &username, &filter)
        .await?;

    let data: Vec<PostData> = items.into_iter().map(|p| post_data(&state, p)).collect();
    Ok(Json(ApiResponse::new(Page::new(data, page, page_size, total))))
}

/// GET /posts/feed/ - Unseen posts for the caller
pub async fn feed(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<PostData>>>, ApiError> {
    let limit = state.config.pagination.post_page_size as i64;
    let items = state.post_service.feed(caller.base_user_id, limit).await?;
    let data: Vec<PostData> = items.into_iter().map(|p| post_data(&state, p)).collect();
    Ok(Json(ApiResponse::new(data)))
}

/// PUT /post/{id}/ - Owner-only caption update
pub async fn update_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostData>>, ApiError> {
    if caller.is_admin() {
        return Err(ApiError::forbidden(error_strings::ADMIN_NOT_ALLOWED));
    }

    let updated = state
        .post_service
        .update_post(caller.base_user_id, id, req.caption)
        .await?;
    Ok(Json(ApiResponse::new(post_data(&state, updated))))
}

/// DELETE /post/{id}/ - Owner-only delete, cascading media removal
pub async fn delete_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if caller.is_admin() {
        return Err(ApiError::forbidden(error_strings::ADMIN_NOT_ALLOWED));
    }

    state
        .post_service
        .delete_post(caller.base_user_id, id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Post deleted!",
        serde_json::json!({}),
    )))
}
