// Base identity model: authentication record behind every profile.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::base_users;

/// Account role stored on the base identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Base user database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = base_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BaseUser {
    pub id: Uuid,
    pub email: String,
    /// None for OAuth-created identities that never set a password
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = base_users)]
pub struct NewBaseUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub role: String,
}

impl BaseUser {
    pub fn role_enum(&self) -> Role {
        Role::from_str(&self.role).unwrap_or_else(|e| {
            tracing::warn!("Invalid role '{}' for base user {}: {}", self.role, self.id, e);
            Role::User
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role_enum() == Role::Admin
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        base_user_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        base_users::table.find(base_user_id).first(conn).await
    }

    /// Find by email (case-insensitive)
    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        email_str: &str,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use diesel::PgTextExpressionMethods;

        base_users::table
            .filter(base_users::email.ilike(email_str))
            .first(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_base_user: NewBaseUser,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(base_users::table)
            .values(&new_base_user)
            .get_result(conn)
            .await
    }

    pub async fn update_password(
        conn: &mut AsyncPgConnection,
        base_user_id: Uuid,
        new_hash: &str,
    ) -> Result<Self, diesel::result::Error> {
        diesel::update(base_users::table.find(base_user_id))
            .set((
                base_users::password_hash.eq(Some(new_hash.to_string())),
                base_users::modified_at.eq(Some(Utc::now())),
            ))
            .get_result(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        base_user_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(base_users::table.find(base_user_id))
            .execute(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::from_str("user"), Ok(Role::User));
        assert_eq!(Role::from_str("admin"), Ok(Role::Admin));
        assert!(Role::from_str("superuser").is_err());
    }
}
