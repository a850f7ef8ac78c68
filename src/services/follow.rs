// Follow graph service: edge state machine and the private-profile
// visibility rule that gates content access across the API.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::{Follow, FollowStatus, NewFollow, User};
use crate::schema::users;
use crate::services::profile::{require_profile, require_user_by_username};
use crate::utils::error_strings;
use crate::utils::ApiError;

pub struct FollowService {
    pool: DieselPool,
}

impl FollowService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    /// Visibility rule for private profiles. Admins bypass; otherwise the
    /// owner and approved followers are the only permitted viewers.
    pub async fn ensure_profile_visible(
        &self,
        conn: &mut AsyncPgConnection,
        viewer_base_user_id: Uuid,
        viewer_is_admin: bool,
        owner: &User,
    ) -> Result<(), ApiError> {
        if viewer_is_admin {
            return Ok(());
        }
        if !owner.is_private() {
            return Ok(());
        }

        let viewer = require_profile(conn, viewer_base_user_id).await?;
        if viewer.id == owner.id {
            return Ok(());
        }

        if Follow::is_approved_follower(conn, viewer.id, owner.id).await? {
            return Ok(());
        }

        Err(ApiError::forbidden(error_strings::PRIVATE_USER))
    }

    /// Create a follow request. Public targets get an approved edge
    /// directly; private targets get a pending one.
    pub async fn send_request(
        &self,
        follower_base_user_id: Uuid,
        target_username: &str,
    ) -> Result<Follow, ApiError> {
        let mut conn = self.pool.get().await?;
        let follower = require_profile(&mut conn, follower_base_user_id).await?;
        let target = require_user_by_username(&mut conn, target_username).await?;

        if follower.id == target.id {
            return Err(ApiError::validation(error_strings::SELF_FOLLOW));
        }

        let status = if target.is_private() {
            FollowStatus::Pending
        } else {
            FollowStatus::Approved
        };

        let edge = Follow::create(
            &mut conn,
            NewFollow {
                follower_id: follower.id,
                following_id: target.id,
                status: status.as_str().to_string(),
            },
        )
        .await?;

        Ok(edge)
    }

    /// Accept a pending request sent to the caller
    pub async fn accept_request(
        &self,
        base_user_id: Uuid,
        follower_username: &str,
    ) -> Result<Follow, ApiError> {
        let mut conn = self.pool.get().await?;
        let target = require_profile(&mut conn, base_user_id).await?;
        let follower = require_user_by_username(&mut conn, follower_username).await?;

        let edge = Follow::find_edge(&mut conn, follower.id, target.id).await?;
        match edge {
            Some(edge) if edge.status_enum() == FollowStatus::Pending => {
                Follow::set_status(&mut conn, edge.id, FollowStatus::Approved)
                    .await
                    .map_err(ApiError::from)
            },
            _ => Err(ApiError::bad_request(error_strings::ACCEPT_WITHOUT_REQUEST)),
        }
    }

    /// Reject a pending request sent to the caller
    pub async fn reject_request(
        &self,
        base_user_id: Uuid,
        follower_username: &str,
    ) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let target = require_profile(&mut conn, base_user_id).await?;
        let follower = require_user_by_username(&mut conn, follower_username).await?;

        let edge = Follow::find_edge(&mut conn, follower.id, target.id).await?;
        match edge {
            Some(edge) if edge.status_enum() == FollowStatus::Pending => {
                Follow::delete(&mut conn, edge.id).await?;
                Ok(())
            },
            _ => Err(ApiError::bad_request(error_strings::REJECT_WITHOUT_REQUEST)),
        }
    }

    /// Cancel a pending request the caller sent. No-ops silently when the
    /// request is already gone.
    pub async fn cancel_request(
        &self,
        base_user_id: Uuid,
        target_username: &str,
    ) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let follower = require_profile(&mut conn, base_user_id).await?;
        let target = require_user_by_username(&mut conn, target_username).await?;

        if let Some(edge) = Follow::find_edge(&mut conn, follower.id, target.id).await? {
            if edge.status_enum() == FollowStatus::Pending {
                Follow::delete(&mut conn, edge.id).await?;
            }
        }
        Ok(())
    }

    /// Remove an approved outgoing edge. Silent no-op when absent.
    pub async fn unfollow(
        &self,
        base_user_id: Uuid,
        target_username: &str,
    ) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let follower = require_profile(&mut conn, base_user_id).await?;
        let target = require_user_by_username(&mut conn, target_username).await?;

        if let Some(edge) = Follow::find_edge(&mut conn, follower.id, target.id).await? {
            if edge.status_enum() == FollowStatus::Approved {
                Follow::delete(&mut conn, edge.id).await?;
            }
        }
        Ok(())
    }

    /// Remove an approved incoming edge. Silent no-op when absent.
    pub async fn remove_follower(
        &self,
        base_user_id: Uuid,
        follower_username: &str,
    ) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let target = require_profile(&mut conn, base_user_id).await?;
        let follower = require_user_by_username(&mut conn, follower_username).await?;

        if let Some(edge) = Follow::find_edge(&mut conn, follower.id, target.id).await? {
            if edge.status_enum() == FollowStatus::Approved {
                Follow::delete(&mut conn, edge.id).await?;
            }
        }
        Ok(())
    }

    /// Pending requests sent to the caller, as follower profiles
    pub async fn pending_received(&self, base_user_id: Uuid) -> Result<Vec<User>, ApiError> {
        let mut conn = self.pool.get().await?;
        let user = require_profile(&mut conn, base_user_id).await?;
        let edges = Follow::incoming_with_status(&mut conn, user.id, FollowStatus::Pending).await?;
        Self::load_profiles(&mut conn, edges.iter().map(|e| e.follower_id).collect()).await
    }

    /// Pending requests the caller has sent, as target profiles
    pub async fn pending_sent(&self, base_user_id: Uuid) -> Result<Vec<User>, ApiError> {
        let mut conn = self.pool.get().await?;
        let user = require_profile(&mut conn, base_user_id).await?;
        let edges = Follow::outgoing_with_status(&mut conn, user.id, FollowStatus::Pending).await?;
        Self::load_profiles(&mut conn, edges.iter().map(|e| e.following_id).collect()).await
    }

    /// Approved followers of a profile, visibility-gated
    pub async fn followers_of(
        &self,
        viewer_base_user_id: Uuid,
        viewer_is_admin: bool,
        username: &str,
    ) -> Result<Vec<User>, ApiError> {
        let mut conn = self.pool.get().await?;
        let owner = require_user_by_username(&mut conn, username).await?;
        self.ensure_profile_visible(&mut conn, viewer_base_user_id, viewer_is_admin, &owner)
            .await?;

        let edges =
            Follow::incoming_with_status(&mut conn, owner.id, FollowStatus::Approved).await?;
        Self::load_profiles(&mut conn, edges.iter().map(|e| e.follower_id).collect()).await
    }

    /// Profiles a user approvedly follows, visibility-gated
    pub async fn following_of(
        &self,
        viewer_base_user_id: Uuid,
        viewer_is_admin: bool,
        username: &str,
    ) -> Result<Vec<User>, ApiError> {
        let mut conn = self.pool.get().await?;
        let owner = require_user_by_username(&mut conn, username).await?;
        self.ensure_profile_visible(&mut conn, viewer_base_user_id, viewer_is_admin, &owner)
            .await?;

        let edges =
            Follow::outgoing_with_status(&mut conn, owner.id, FollowStatus::Approved).await?;
        Self::load_profiles(&mut conn, edges.iter().map(|e| e.following_id).collect()).await
    }

    async fn load_profiles(
        conn: &mut AsyncPgConnection,
        ids: Vec<Uuid>,
    ) -> Result<Vec<User>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        users::table
            .filter(users::id.eq_any(ids))
            .order(users::username.asc())
            .load(conn)
            .await
            .map_err(ApiError::from)
    }
}
