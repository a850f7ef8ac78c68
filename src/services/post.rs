// Post service: creation with media upload, visibility-gated listing,
// owner-scoped update/delete, the admin moderation delete, and the unseen
// feed query backing the digest job.

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::{
    media::VALID_POST_MEDIA_TYPES, post_object_key, BaseUser, Media, NewMedia, NewPost, Post,
    PostFilter, User,
};
use crate::schema::{comments, likes, media, posts, reported_posts};
use crate::services::follow::FollowService;
use crate::services::profile::{require_profile, require_user_by_username};
use crate::services::storage::StorageService;
use crate::services::email::EmailService;
use crate::utils::error_strings;
use crate::utils::{trim_optional_field, ApiError};

/// Longest accepted caption after trimming
pub const MAX_CAPTION_LENGTH: usize = 2200;

/// An uploaded media part: (content type, bytes)
pub type MediaUpload = (String, Vec<u8>);

/// A post together with its media rows
#[derive(Debug, Clone)]
pub struct PostWithMedia {
    pub post: Post,
    pub media: Vec<Media>,
}

pub struct PostService {
    pool: DieselPool,
    storage: Arc<StorageService>,
    email: Arc<EmailService>,
    follow: Arc<FollowService>,
}

/// Normalize and bound a caption
pub fn clean_caption(caption: Option<&String>) -> Result<Option<String>, ApiError> {
    let caption = trim_optional_field(caption);
    if let Some(ref caption) = caption {
        if caption.chars().count() > MAX_CAPTION_LENGTH {
            return Err(ApiError::validation(format!(
                "caption: must be at most {} characters",
                MAX_CAPTION_LENGTH
            )));
        }
    }
    Ok(caption)
}

/// Check every upload against the accepted content types
pub fn validate_media_types(files: &[MediaUpload]) -> Result<(), ApiError> {
    for (content_type, _) in files {
        if !VALID_POST_MEDIA_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::validation(format!(
                "Invalid file type. Accepted valid types: {:?}",
                VALID_POST_MEDIA_TYPES
            )));
        }
    }
    Ok(())
}

impl PostService {
    pub fn new(
        pool: DieselPool,
        storage: Arc<StorageService>,
        email: Arc<EmailService>,
        follow: Arc<FollowService>,
    ) -> Self {
        Self {
            pool,
            storage,
            email,
            follow,
        }
    }

    /// Presigned GET URL for a media row, for serialization
    pub fn media_url(&self, item: &Media) -> String {
        self.storage.presigned_get_url(&item.media_key)
    }

    /// Create a post with its media files. Each file is stored under a
    /// deterministic object key and recorded as a media row.
    pub async fn create_post(
        &self,
        author_base_user_id: Uuid,
        caption: Option<String>,
        files: Vec<MediaUpload>,
    ) -> Result<PostWithMedia, ApiError> {
        let mut conn = self.pool.get().await?;
        let author = require_profile(&mut conn, author_base_user_id).await?;

        let caption = clean_caption(caption.as_ref())?;
        validate_media_types(&files)?;

        let post = Post::create(
            &mut conn,
            NewPost {
                posted_by: author.id,
                caption,
            },
        )
        .await?;

        let mut stored = Vec::with_capacity(files.len());
        for (index, (content_type, bytes)) in files.into_iter().enumerate() {
            let key = post_object_key(author.id, post.id, index, &content_type);
            self.storage
                .put_object(&key, bytes, &content_type)
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;

            let row = Media::create(
                &mut conn,
                NewMedia {
                    post_id: post.id,
                    media_key: key,
                    media_type: content_type,
                },
            )
            .await?;
            stored.push(row);
        }

        Ok(PostWithMedia {
            post,
            media: stored,
        })
    }

    /// List a profile's posts, enforcing the visibility rule for private
    /// authors. Returns the page plus the unpaginated total.
    pub async fn list_posts_by_username(
        &self,
        viewer_base_user_id: Uuid,
        viewer_is_admin: bool,
        username: &str,
        filter: &PostFilter,
    ) -> Result<(Vec<PostWithMedia>, i64), ApiError> {
        let mut conn = self.pool.get().await?;
        let owner = require_user_by_username(&mut conn, username).await?;
        self.follow
            .ensure_profile_visible(&mut conn, viewer_base_user_id, viewer_is_admin, &owner)
            .await?;

        let (items, total) = Post::list_by_user(&mut conn, owner.id, filter).await?;
        let with_media = Self::attach_media(&mut conn, items).await?;
        Ok((with_media, total))
    }

    /// Unseen posts for the viewer: not yet liked, authored by public
    /// profiles or approved-followed profiles, never the viewer's own.
    pub async fn feed(
        &self,
        viewer_base_user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PostWithMedia>, ApiError> {
        let mut conn = self.pool.get().await?;
        let viewer = require_profile(&mut conn, viewer_base_user_id).await?;
        let items = Post::unseen_for_viewer(&mut conn, viewer.id, limit).await?;
        Self::attach_media(&mut conn, items).await
    }

    /// Owner-only caption update
    pub async fn update_post(
        &self,
        base_user_id: Uuid,
        post_id: Uuid,
        caption: Option<String>,
    ) -> Result<PostWithMedia, ApiError> {
        let mut conn = self.pool.get().await?;
        let author = require_profile(&mut conn, base_user_id).await?;

        let post = Post::find_by_id(&mut conn, post_id).await?;
        let post = match post {
            Some(post) if post.posted_by == author.id => post,
            _ => return Err(ApiError::not_found(error_strings::POST_NOT_FOUND)),
        };

        let caption = clean_caption(caption.as_ref())?;
        let updated = Post::update_caption(&mut conn, post.id, caption).await?;
        let media = Media::find_by_post(&mut conn, updated.id).await?;
        Ok(PostWithMedia {
            post: updated,
            media,
        })
    }

    /// Owner-only delete: storage objects first, then all rows in one
    /// transaction.
    pub async fn delete_post(&self, base_user_id: Uuid, post_id: Uuid) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let author = require_profile(&mut conn, base_user_id).await?;

        let post = Post::find_by_id(&mut conn, post_id).await?;
        let post = match post {
            Some(post) if post.posted_by == author.id => post,
            _ => return Err(ApiError::not_found(error_strings::POST_NOT_FOUND)),
        };

        self.delete_post_objects_and_rows(&mut conn, &post).await
    }

    /// Moderation delete: any post regardless of owner, then a notification
    /// email to the author (best effort).
    pub async fn admin_delete_post(&self, post_id: Uuid) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;

        let post = Post::find_by_id(&mut conn, post_id)
            .await?
            .ok_or_else(|| ApiError::not_found(error_strings::POST_NOT_FOUND))?;

        let author = User::find_by_id(&mut conn, post.posted_by).await?;

        self.delete_post_objects_and_rows(&mut conn, &post).await?;

        if let Some(author) = author {
            match BaseUser::find_by_id(&mut conn, author.base_user_id).await {
                Ok(base_user) => {
                    if let Err(e) = self
                        .email
                        .send_post_removed_email(&base_user.email, &author.username)
                        .await
                    {
                        warn!("Failed to notify {} about removed post: {}", author.username, e);
                    }
                },
                Err(e) => warn!("Author lookup failed for removed post: {}", e),
            }
        }

        Ok(())
    }

    async fn delete_post_objects_and_rows(
        &self,
        conn: &mut AsyncPgConnection,
        post: &Post,
    ) -> Result<(), ApiError> {
        let attachments = Media::find_by_post(conn, post.id).await?;
        for item in &attachments {
            self.storage
                .delete_object(&item.media_key)
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;
        }

        let post_id = post.id;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(likes::table.filter(likes::post_id.eq(post_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(comments::table.filter(comments::post_id.eq(post_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(reported_posts::table.filter(reported_posts::post_id.eq(post_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(media::table.filter(media::post_id.eq(post_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(posts::table.find(post_id)).execute(conn).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        Ok(())
    }

    async fn attach_media(
        conn: &mut AsyncPgConnection,
        items: Vec<Post>,
    ) -> Result<Vec<PostWithMedia>, ApiError> {
        let mut result = Vec::with_capacity(items.len());
        for post in items {
            let media = Media::find_by_post(conn, post.id).await?;
            result.push(PostWithMedia { post, media });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_caption_trims_and_caps() {
        assert_eq!(
            clean_caption(Some(&"  hello world  ".to_string())).unwrap(),
            Some("hello world".to_string())
        );
        assert_eq!(clean_caption(Some(&"   ".to_string())).unwrap(), None);
        assert_eq!(clean_caption(None).unwrap(), None);

        let long = "x".repeat(MAX_CAPTION_LENGTH + 1);
        assert!(clean_caption(Some(&long)).is_err());

        let max = "x".repeat(MAX_CAPTION_LENGTH);
        assert!(clean_caption(Some(&max)).is_ok());
    }

    #[test]
    fn test_validate_media_types() {
        let ok: Vec<MediaUpload> = vec![
            ("image/jpeg".to_string(), vec![1]),
            ("video/mp4".to_string(), vec![2]),
        ];
        assert!(validate_media_types(&ok).is_ok());

        let bad: Vec<MediaUpload> = vec![("image/gif".to_string(), vec![1])];
        let err = validate_media_types(&bad).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
