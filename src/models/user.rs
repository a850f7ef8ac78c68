// User profile model: the public-facing entity behind a base identity.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::users;

/// Profile visibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Public,
    Private,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Public => "public",
            ProfileType::Private => "private",
        }
    }
}

impl FromStr for ProfileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(ProfileType::Public),
            "private" => Ok(ProfileType::Private),
            _ => Err(format!("Invalid profile type: {}", s)),
        }
    }
}

/// User profile database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub base_user_id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub profile_image_key: Option<String>,
    pub profile_type: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub base_user_id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub profile_type: String,
}

/// Partial profile update; `None` fields are left untouched
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_image_key: Option<String>,
    pub profile_type: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn profile_type_enum(&self) -> ProfileType {
        ProfileType::from_str(&self.profile_type).unwrap_or_else(|e| {
            tracing::warn!(
                "Invalid profile type '{}' for user {}: {}",
                self.profile_type,
                self.id,
                e
            );
            ProfileType::Public
        })
    }

    pub fn is_private(&self) -> bool {
        self.profile_type_enum() == ProfileType::Private
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        users::table.find(user_id).first(conn).await.optional()
    }

    pub async fn find_by_username(
        conn: &mut AsyncPgConnection,
        username_str: &str,
    ) -> Result<Option<Self>, diesel::result::Error> {
        users::table
            .filter(users::username.eq(username_str))
            .first(conn)
            .await
            .optional()
    }

    pub async fn find_by_base_user_id(
        conn: &mut AsyncPgConnection,
        base_user_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        users::table
            .filter(users::base_user_id.eq(base_user_id))
            .first(conn)
            .await
            .optional()
    }

    pub async fn list_all(
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        users::table.order(users::username.asc()).load(conn).await
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_user: NewUser,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(users::table)
            .values(&new_user)
            .get_result(conn)
            .await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        mut update: UserUpdate,
    ) -> Result<Self, diesel::result::Error> {
        update.modified_at = Some(Utc::now());
        diesel::update(users::table.find(user_id))
            .set(&update)
            .get_result(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(users::table.find(user_id)).execute(conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_type_conversion() {
        assert_eq!(ProfileType::Public.as_str(), "public");
        assert_eq!(ProfileType::Private.as_str(), "private");
        assert_eq!(ProfileType::from_str("public"), Ok(ProfileType::Public));
        assert_eq!(ProfileType::from_str("private"), Ok(ProfileType::Private));
        assert!(ProfileType::from_str("hidden").is_err());
    }
}
