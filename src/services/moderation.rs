// Post reporting and the admin moderation queue.

use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::{
    Follow, NewReportedPost, Post, ReportReason, ReportedPost, User,
};
use crate::services::profile::require_profile;
use crate::utils::error_strings;
use crate::utils::{trim_optional_field, ApiError};

pub struct ModerationService {
    pool: DieselPool,
}

impl ModerationService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    /// Report a post. Reporting a private author's post requires being an
    /// approved follower or the author themself; a duplicate report by the
    /// same user is a Conflict.
    pub async fn report_post(
        &self,
        reporter_base_user_id: Uuid,
        post_id: Uuid,
        reason: ReportReason,
        additional_text: Option<String>,
    ) -> Result<ReportedPost, ApiError> {
        let mut conn = self.pool.get().await?;
        let reporter = require_profile(&mut conn, reporter_base_user_id).await?;

        let post = Post::find_by_id(&mut conn, post_id)
            .await?
            .ok_or_else(|| ApiError::not_found(error_strings::POST_NOT_FOUND))?;

        if let Some(author) = User::find_by_id(&mut conn, post.posted_by).await? {
            if author.is_private()
                && author.id != reporter.id
                && !Follow::is_approved_follower(&mut conn, reporter.id, author.id).await?
            {
                return Err(ApiError::forbidden(error_strings::PRIVATE_USER));
            }
        }

        ReportedPost::create(
            &mut conn,
            NewReportedPost {
                reported_by: reporter.id,
                post_id: post.id,
                reason: reason.as_str().to_string(),
                additional_text: trim_optional_field(additional_text.as_ref()),
            },
        )
        .await
        .map_err(ApiError::from)
    }

    /// All open reports, newest first. Admin-only at the handler layer.
    pub async fn list_reports(&self) -> Result<Vec<ReportedPost>, ApiError> {
        let mut conn = self.pool.get().await?;
        ReportedPost::list_all(&mut conn).await.map_err(ApiError::from)
    }
}
