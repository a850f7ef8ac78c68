// Admin marker model, created automatically for admin-role identities.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::admins;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = admins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Admin {
    pub id: Uuid,
    pub base_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admins)]
pub struct NewAdmin {
    pub base_user_id: Uuid,
}

impl Admin {
    pub async fn find_by_base_user_id(
        conn: &mut AsyncPgConnection,
        base_user_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        admins::table
            .filter(admins::base_user_id.eq(base_user_id))
            .first(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_admin: NewAdmin,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(admins::table)
            .values(&new_admin)
            .get_result(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        admin_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(admins::table.find(admin_id)).execute(conn).await
    }
}
