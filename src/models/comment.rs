// Comment rows on posts.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::comments;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: Uuid,
    pub commented_by: Uuid,
    pub post_id: Uuid,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub commented_by: Uuid,
    pub post_id: Uuid,
    pub comment: String,
}

impl Comment {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        comment_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        comments::table.find(comment_id).first(conn).await.optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_comment: NewComment,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(comments::table)
            .values(&new_comment)
            .get_result(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        comment_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(comments::table.find(comment_id))
            .execute(conn)
            .await
    }
}
