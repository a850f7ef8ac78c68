// Like rows. Idempotency rides on the (liked_by, post_id) unique constraint;
// a duplicate insert surfaces as a Conflict at the API boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::likes;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Like {
    pub id: Uuid,
    pub liked_by: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub liked_by: Uuid,
    pub post_id: Uuid,
}

impl Like {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_like: NewLike,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(likes::table)
            .values(&new_like)
            .get_result(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        liker: Uuid,
        post: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(
            likes::table
                .filter(likes::liked_by.eq(liker))
                .filter(likes::post_id.eq(post)),
        )
        .execute(conn)
        .await
    }
}
