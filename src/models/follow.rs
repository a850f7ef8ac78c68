// Follow graph model: directed edges between profiles with an approval
// status. An absent edge means rejected / cancelled / removed.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::follows;

/// Edge status. Deletion models the rejected/cancelled/removed outcomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    Pending,
    Approved,
}

impl FollowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowStatus::Pending => "pending",
            FollowStatus::Approved => "approved",
        }
    }
}

impl FromStr for FollowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FollowStatus::Pending),
            "approved" => Ok(FollowStatus::Approved),
            _ => Err(format!("Invalid follow status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Follow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub status: String,
}

impl Follow {
    pub fn status_enum(&self) -> FollowStatus {
        FollowStatus::from_str(&self.status).unwrap_or_else(|e| {
            tracing::warn!("Invalid follow status '{}' on edge {}: {}", self.status, self.id, e);
            FollowStatus::Pending
        })
    }

    /// Find the directed edge follower -> following, if any
    pub async fn find_edge(
        conn: &mut AsyncPgConnection,
        follower: Uuid,
        following: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        follows::table
            .filter(follows::follower_id.eq(follower))
            .filter(follows::following_id.eq(following))
            .first(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_follow: NewFollow,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(follows::table)
            .values(&new_follow)
            .get_result(conn)
            .await
    }

    pub async fn set_status(
        conn: &mut AsyncPgConnection,
        edge_id: Uuid,
        status: FollowStatus,
    ) -> Result<Self, diesel::result::Error> {
        diesel::update(follows::table.find(edge_id))
            .set((
                follows::status.eq(status.as_str()),
                follows::modified_at.eq(Some(Utc::now())),
            ))
            .get_result(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        edge_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(follows::table.find(edge_id)).execute(conn).await
    }

    /// Incoming edges for a profile with the given status
    pub async fn incoming_with_status(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        status: FollowStatus,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        follows::table
            .filter(follows::following_id.eq(user_id))
            .filter(follows::status.eq(status.as_str()))
            .order(follows::created_at.desc())
            .load(conn)
            .await
    }

    /// Outgoing edges for a profile with the given status
    pub async fn outgoing_with_status(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        status: FollowStatus,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        follows::table
            .filter(follows::follower_id.eq(user_id))
            .filter(follows::status.eq(status.as_str()))
            .order(follows::created_at.desc())
            .load(conn)
            .await
    }

    /// True when `viewer` has an approved edge onto `owner`
    pub async fn is_approved_follower(
        conn: &mut AsyncPgConnection,
        viewer: Uuid,
        owner: Uuid,
    ) -> Result<bool, diesel::result::Error> {
        let count: i64 = follows::table
            .filter(follows::follower_id.eq(viewer))
            .filter(follows::following_id.eq(owner))
            .filter(follows::status.eq(FollowStatus::Approved.as_str()))
            .count()
            .get_result(conn)
            .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_status_conversion() {
        assert_eq!(FollowStatus::Pending.as_str(), "pending");
        assert_eq!(FollowStatus::Approved.as_str(), "approved");
        assert_eq!(FollowStatus::from_str("pending"), Ok(FollowStatus::Pending));
        assert_eq!(
            FollowStatus::from_str("approved"),
            Ok(FollowStatus::Approved)
        );
        assert!(FollowStatus::from_str("rejected").is_err());
    }
}
