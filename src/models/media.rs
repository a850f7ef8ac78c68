// Media rows attached to a post. `media_key` is the opaque storage object
// key; presigned URLs are generated at serialization time, never stored.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::media;

/// Content types accepted for post uploads
pub const VALID_POST_MEDIA_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/heic",
    "image/jpg",
    "video/mp4",
    "video/mpeg",
];

/// Content types accepted for profile images
pub const VALID_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/heic", "image/jpg"];

/// File extension for an accepted content type
pub fn extension_for(media_type: &str) -> &str {
    match media_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/heic" => "heic",
        "video/mp4" => "mp4",
        "video/mpeg" => "mpeg",
        other => other.rsplit('/').next().unwrap_or("bin"),
    }
}

/// Deterministic object key for the nth media file of a post
pub fn post_object_key(user_id: Uuid, post_id: Uuid, index: usize, media_type: &str) -> String {
    format!(
        "posts/{}/{}/post_{}.{}",
        user_id,
        post_id,
        index,
        extension_for(media_type)
    )
}

/// Object key for a profile image
pub fn profile_object_key(user_id: Uuid, media_type: &str) -> String {
    format!("profiles/{}/profile.{}", user_id, extension_for(media_type))
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = media)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Media {
    pub id: Uuid,
    pub post_id: Uuid,
    pub media_key: String,
    pub media_type: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = media)]
pub struct NewMedia {
    pub post_id: Uuid,
    pub media_key: String,
    pub media_type: String,
}

impl Media {
    pub async fn find_by_post(
        conn: &mut AsyncPgConnection,
        post: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        media::table
            .filter(media::post_id.eq(post))
            .order(media::created_at.asc())
            .load(conn)
            .await
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_media: NewMedia,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(media::table)
            .values(&new_media)
            .get_result(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_allow_list() {
        assert!(VALID_POST_MEDIA_TYPES.contains(&"image/jpeg"));
        assert!(VALID_POST_MEDIA_TYPES.contains(&"video/mp4"));
        assert!(!VALID_POST_MEDIA_TYPES.contains(&"image/gif"));
        assert!(!VALID_IMAGE_TYPES.contains(&"video/mp4"));
    }

    #[test]
    fn test_object_key_layout() {
        let user = Uuid::nil();
        let post = Uuid::nil();
        let key = post_object_key(user, post, 0, "image/png");
        assert_eq!(
            key,
            format!("posts/{}/{}/post_0.png", user, post)
        );

        let key = post_object_key(user, post, 3, "video/mp4");
        assert!(key.ends_with("/post_3.mp4"));

        let key = profile_object_key(user, "image/jpg");
        assert_eq!(key, format!("profiles/{}/profile.jpg", user));
    }
}
