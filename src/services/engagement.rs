// Likes and comments. Both are gated by the private-profile visibility
// rule when the post author is private.

use std::sync::Arc;
use uuid::Uuid;

use diesel_async::AsyncPgConnection;

use crate::db::DieselPool;
use crate::models::{Comment, Like, NewComment, NewLike, Post, User};
use crate::services::follow::FollowService;
use crate::services::profile::require_profile;
use crate::utils::error_strings;
use crate::utils::{trim_and_validate_field, ApiError};

/// Longest accepted comment after trimming
pub const MAX_COMMENT_LENGTH: usize = 300;

pub struct EngagementService {
    pool: DieselPool,
    follow: Arc<FollowService>,
}

impl EngagementService {
    pub fn new(pool: DieselPool, follow: Arc<FollowService>) -> Self {
        Self { pool, follow }
    }

    /// Resolve the post and enforce visibility against its author
    async fn visible_post(
        &self,
        conn: &mut AsyncPgConnection,
        viewer_base_user_id: Uuid,
        viewer_is_admin: bool,
        post_id: Uuid,
    ) -> Result<Post, ApiError> {
        let post = Post::find_by_id(conn, post_id)
            .await?
            .ok_or_else(|| ApiError::not_found(error_strings::POST_NOT_FOUND))?;

        if let Some(author) = User::find_by_id(conn, post.posted_by).await? {
            self.follow
                .ensure_profile_visible(conn, viewer_base_user_id, viewer_is_admin, &author)
                .await?;
        }

        Ok(post)
    }

    /// Like a post. The unique (liked_by, post_id) constraint turns a
    /// duplicate like into a Conflict.
    pub async fn like_post(
        &self,
        viewer_base_user_id: Uuid,
        viewer_is_admin: bool,
        post_id: Uuid,
    ) -> Result<Like, ApiError> {
        let mut conn = self.pool.get().await?;
        let viewer = require_profile(&mut conn, viewer_base_user_id).await?;
        let post = self
            .visible_post(&mut conn, viewer_base_user_id, viewer_is_admin, post_id)
            .await?;

        Like::create(
            &mut conn,
            NewLike {
                liked_by: viewer.id,
                post_id: post.id,
            },
        )
        .await
        .map_err(ApiError::from)
    }

    /// Remove the caller's like. Silent no-op when absent.
    pub async fn unlike_post(
        &self,
        viewer_base_user_id: Uuid,
        post_id: Uuid,
    ) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let viewer = require_profile(&mut conn, viewer_base_user_id).await?;
        Like::delete(&mut conn, viewer.id, post_id).await?;
        Ok(())
    }

    /// Comment on a post; requires the post to exist and be visible
    pub async fn comment_on_post(
        &self,
        viewer_base_user_id: Uuid,
        viewer_is_admin: bool,
        post_id: Uuid,
        comment: &str,
    ) -> Result<Comment, ApiError> {
        let mut conn = self.pool.get().await?;
        let viewer = require_profile(&mut conn, viewer_base_user_id).await?;
        let post = self
            .visible_post(&mut conn, viewer_base_user_id, viewer_is_admin, post_id)
            .await?;

        let comment = trim_and_validate_field(comment, true)
            .map_err(|e| ApiError::validation(format!("comment: {}", e)))?;
        if comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(ApiError::validation(format!(
                "comment: must be at most {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        Comment::create(
            &mut conn,
            NewComment {
                commented_by: viewer.id,
                post_id: post.id,
                comment,
            },
        )
        .await
        .map_err(ApiError::from)
    }

    /// Delete a comment; only its author may do so
    pub async fn delete_comment(
        &self,
        viewer_base_user_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let viewer = require_profile(&mut conn, viewer_base_user_id).await?;

        let comment = Comment::find_by_id(&mut conn, comment_id)
            .await?
            .ok_or_else(|| ApiError::not_found(error_strings::COMMENT_NOT_FOUND))?;

        if comment.commented_by != viewer.id {
            return Err(ApiError::forbidden(error_strings::NO_PERMISSION));
        }

        Comment::delete(&mut conn, comment.id).await?;
        Ok(())
    }
}
