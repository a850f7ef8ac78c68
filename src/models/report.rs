// Post report rows for the moderation workflow.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::reported_posts;

/// Reason a post was reported
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Harassment,
    InappropriateContent,
    Misinformation,
    Other,
}

impl ReportReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportReason::Spam => "spam",
            ReportReason::Harassment => "harassment",
            ReportReason::InappropriateContent => "inappropriate_content",
            ReportReason::Misinformation => "misinformation",
            ReportReason::Other => "other",
        }
    }
}

impl FromStr for ReportReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spam" => Ok(ReportReason::Spam),
            "harassment" => Ok(ReportReason::Harassment),
            "inappropriate_content" => Ok(ReportReason::InappropriateContent),
            "misinformation" => Ok(ReportReason::Misinformation),
            "other" => Ok(ReportReason::Other),
            _ => Err(format!("Invalid report reason: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = reported_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReportedPost {
    pub id: Uuid,
    pub reported_by: Uuid,
    pub post_id: Uuid,
    pub reason: String,
    pub additional_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reported_posts)]
pub struct NewReportedPost {
    pub reported_by: Uuid,
    pub post_id: Uuid,
    pub reason: String,
    pub additional_text: Option<String>,
}

impl ReportedPost {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_report: NewReportedPost,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(reported_posts::table)
            .values(&new_report)
            .get_result(conn)
            .await
    }

    pub async fn list_all(
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        reported_posts::table
            .order(reported_posts::created_at.desc())
            .load(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_reason_round_trip() {
        for reason in [
            ReportReason::Spam,
            ReportReason::Harassment,
            ReportReason::InappropriateContent,
            ReportReason::Misinformation,
            ReportReason::Other,
        ] {
            assert_eq!(ReportReason::from_str(reason.as_str()), Ok(reason));
        }
        assert!(ReportReason::from_str("boring").is_err());
    }
}
