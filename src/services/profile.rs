// Profile and account management: profile lookup/update/deletion, the
// identity record endpoints, and the application-level delete cascades.

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::{
    media::VALID_IMAGE_TYPES, profile_object_key, Admin, BaseUser, Media, User, UserUpdate,
};
use crate::schema::{
    admins, base_users, comments, follows, likes, media, otps, posts, reported_posts,
    subscriptions, transactions, users,
};
use crate::services::storage::StorageService;
use crate::utils::error_strings;
use crate::utils::{trim_optional_field, validate_username, ApiError};

/// Resolve the caller's profile or fail with NotFound
pub(crate) async fn require_profile(
    conn: &mut AsyncPgConnection,
    base_user_id: Uuid,
) -> Result<User, ApiError> {
    User::find_by_base_user_id(conn, base_user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(error_strings::USER_NOT_CREATED))
}

/// Resolve a profile by username or fail with NotFound
pub(crate) async fn require_user_by_username(
    conn: &mut AsyncPgConnection,
    username: &str,
) -> Result<User, ApiError> {
    User::find_by_username(conn, username)
        .await?
        .ok_or_else(|| ApiError::not_found(error_strings::USER_NOT_FOUND))
}

/// Fields accepted by a profile update
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_type: Option<String>,
    /// Raw avatar upload: (content type, bytes)
    pub avatar: Option<(String, Vec<u8>)>,
}

pub struct ProfileService {
    pool: DieselPool,
    storage: Arc<StorageService>,
}

impl ProfileService {
    pub fn new(pool: DieselPool, storage: Arc<StorageService>) -> Self {
        Self { pool, storage }
    }

    /// Attach a presigned avatar URL to a profile for serialization
    pub fn avatar_url(&self, user: &User) -> Option<String> {
        user.profile_image_key
            .as_ref()
            .map(|key| self.storage.presigned_get_url(key))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, ApiError> {
        let mut conn = self.pool.get().await?;
        require_user_by_username(&mut conn, username).await
    }

    pub async fn get_own_profile(&self, base_user_id: Uuid) -> Result<User, ApiError> {
        let mut conn = self.pool.get().await?;
        require_profile(&mut conn, base_user_id).await
    }

    pub async fn list_usernames(&self) -> Result<Vec<String>, ApiError> {
        let mut conn = self.pool.get().await?;
        let all = User::list_all(&mut conn).await?;
        Ok(all.into_iter().map(|u| u.username).collect())
    }

    pub async fn get_base_user(&self, base_user_id: Uuid) -> Result<BaseUser, ApiError> {
        let mut conn = self.pool.get().await?;
        BaseUser::find_by_id(&mut conn, base_user_id)
            .await
            .map_err(ApiError::from)
    }

    pub async fn get_admin(&self, base_user_id: Uuid) -> Result<Admin, ApiError> {
        let mut conn = self.pool.get().await?;
        Admin::find_by_base_user_id(&mut conn, base_user_id)
            .await?
            .ok_or_else(|| ApiError::not_found(error_strings::ADMIN_NOT_CREATED))
    }

    /// Update the caller's profile; optionally replaces the avatar object.
    pub async fn update_profile(
        &self,
        base_user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, ApiError> {
        let mut conn = self.pool.get().await?;
        let user = require_profile(&mut conn, base_user_id).await?;

        if let Some(ref username) = update.username {
            validate_username(username)
                .map_err(|_| ApiError::validation("username: 3-30 lowercase chars, digits, '.' or '_'"))?;
        }
        if let Some(ref profile_type) = update.profile_type {
            profile_type
                .parse::<crate::models::ProfileType>()
                .map_err(ApiError::validation)?;
        }

        let mut profile_image_key = None;
        if let Some((content_type, bytes)) = update.avatar {
            if !VALID_IMAGE_TYPES.contains(&content_type.as_str()) {
                return Err(ApiError::validation(format!(
                    "Invalid file type. Accepted valid types: {:?}",
                    VALID_IMAGE_TYPES
                )));
            }
            let key = profile_object_key(user.id, &content_type);
            self.storage
                .put_object(&key, bytes, &content_type)
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;
            profile_image_key = Some(key);
        }

        let changes = UserUpdate {
            username: update.username,
            bio: trim_optional_field(update.bio.as_ref()),
            profile_image_key,
            profile_type: update.profile_type,
            modified_at: None,
        };

        User::update(&mut conn, user.id, changes)
            .await
            .map_err(ApiError::from)
    }

    /// Delete the caller's profile and everything hanging off it. Storage
    /// objects go first, then all rows in one transaction.
    pub async fn delete_profile(&self, base_user_id: Uuid) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let user = require_profile(&mut conn, base_user_id).await?;

        self.delete_profile_storage_objects(&mut conn, &user).await?;
        Self::delete_profile_rows(&mut conn, user.id).await?;
        Ok(())
    }

    /// Delete the whole account: profile (or admin marker), otp, and the
    /// base identity row.
    pub async fn delete_account(&self, base_user_id: Uuid) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;

        if let Some(user) = User::find_by_base_user_id(&mut conn, base_user_id).await? {
            self.delete_profile_storage_objects(&mut conn, &user).await?;
            Self::delete_profile_rows(&mut conn, user.id).await?;
        }

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(admins::table.filter(admins::base_user_id.eq(base_user_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(otps::table.filter(otps::base_user_id.eq(base_user_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(base_users::table.find(base_user_id))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        Ok(())
    }

    pub async fn delete_admin(&self, base_user_id: Uuid) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let admin = Admin::find_by_base_user_id(&mut conn, base_user_id).await?;
        if let Some(admin) = admin {
            Admin::delete(&mut conn, admin.id).await?;
        }
        Ok(())
    }

    /// Remove every storage object owned by the profile: post media and the
    /// avatar. Failures abort the deletion so no orphaned rows appear.
    async fn delete_profile_storage_objects(
        &self,
        conn: &mut AsyncPgConnection,
        user: &User,
    ) -> Result<(), ApiError> {
        let post_ids: Vec<Uuid> = posts::table
            .filter(posts::posted_by.eq(user.id))
            .select(posts::id)
            .load(conn)
            .await?;

        for post_id in &post_ids {
            for item in Media::find_by_post(conn, *post_id).await? {
                self.storage
                    .delete_object(&item.media_key)
                    .await
                    .map_err(|e| ApiError::internal(e.to_string()))?;
            }
        }

        if let Some(ref key) = user.profile_image_key {
            self.storage
                .delete_object(key)
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;
        }

        Ok(())
    }

    /// Application-level cascade for a profile: children first, then the
    /// profile row, all inside one transaction.
    async fn delete_profile_rows(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<(), ApiError> {
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let post_ids: Vec<Uuid> = posts::table
                    .filter(posts::posted_by.eq(user_id))
                    .select(posts::id)
                    .load(conn)
                    .await?;

                diesel::delete(
                    likes::table.filter(
                        likes::post_id
                            .eq_any(&post_ids)
                            .or(likes::liked_by.eq(user_id)),
                    ),
                )
                .execute(conn)
                .await?;

                diesel::delete(
                    comments::table.filter(
                        comments::post_id
                            .eq_any(&post_ids)
                            .or(comments::commented_by.eq(user_id)),
                    ),
                )
                .execute(conn)
                .await?;

                diesel::delete(
                    reported_posts::table.filter(
                        reported_posts::post_id
                            .eq_any(&post_ids)
                            .or(reported_posts::reported_by.eq(user_id)),
                    ),
                )
                .execute(conn)
                .await?;

                diesel::delete(media::table.filter(media::post_id.eq_any(&post_ids)))
                    .execute(conn)
                    .await?;

                diesel::delete(posts::table.filter(posts::posted_by.eq(user_id)))
                    .execute(conn)
                    .await?;

                diesel::delete(
                    follows::table.filter(
                        follows::follower_id
                            .eq(user_id)
                            .or(follows::following_id.eq(user_id)),
                    ),
                )
                .execute(conn)
                .await?;

                diesel::delete(subscriptions::table.filter(subscriptions::user_id.eq(user_id)))
                    .execute(conn)
                    .await?;

                diesel::delete(transactions::table.filter(transactions::user_id.eq(user_id)))
                    .execute(conn)
                    .await?;

                diesel::delete(users::table.find(user_id)).execute(conn).await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        Ok(())
    }
}
