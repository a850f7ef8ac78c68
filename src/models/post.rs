// Post model plus the listing and feed queries.

use chrono::{DateTime, Months, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::follow::FollowStatus;
use crate::models::user::ProfileType;
use crate::schema::{follows, likes, posts, users};

/// Relative-date floor filter for post listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CreatedWithin {
    ThisMonth,
    Last6Months,
    Last1Year,
    Last10Years,
}

impl CreatedWithin {
    fn months_back(&self) -> u32 {
        match self {
            CreatedWithin::ThisMonth => 1,
            CreatedWithin::Last6Months => 6,
            CreatedWithin::Last1Year => 12,
            CreatedWithin::Last10Years => 120,
        }
    }

    /// Earliest `created_at` admitted by this filter, relative to `now`
    pub fn floor_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.months_back()))
            .unwrap_or(now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: Uuid,
    pub posted_by: Uuid,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub posted_by: Uuid,
    pub caption: Option<String>,
}

/// Filter parameters for listing a profile's posts
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub search: Option<String>,
    pub created_within: Option<CreatedWithin>,
    pub page: u32,
    pub page_size: u32,
}

impl Post {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        post_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        posts::table.find(post_id).first(conn).await.optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_post: NewPost,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(posts::table)
            .values(&new_post)
            .get_result(conn)
            .await
    }

    pub async fn update_caption(
        conn: &mut AsyncPgConnection,
        post_id: Uuid,
        caption: Option<String>,
    ) -> Result<Self, diesel::result::Error> {
        diesel::update(posts::table.find(post_id))
            .set((
                posts::caption.eq(caption),
                posts::modified_at.eq(Some(Utc::now())),
            ))
            .get_result(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        post_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(posts::table.find(post_id)).execute(conn).await
    }

    /// Page of a profile's posts, newest first, with optional caption search
    /// and relative-date floor. Returns the page plus the unpaginated total.
    pub async fn list_by_user(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        filter: &PostFilter,
    ) -> Result<(Vec<Self>, i64), diesel::result::Error> {
        use diesel::PgTextExpressionMethods;

        let pattern = filter.search.as_ref().map(|s| format!("%{}%", s));
        let floor = filter
            .created_within
            .map(|within| within.floor_from(Utc::now()));

        let mut count_query = posts::table
            .filter(posts::posted_by.eq(user_id))
            .into_boxed::<diesel::pg::Pg>();
        let mut page_query = posts::table
            .filter(posts::posted_by.eq(user_id))
            .into_boxed::<diesel::pg::Pg>();

        if let Some(ref pattern) = pattern {
            count_query = count_query.filter(posts::caption.ilike(pattern.clone()));
            page_query = page_query.filter(posts::caption.ilike(pattern.clone()));
        }
        if let Some(floor) = floor {
            count_query = count_query.filter(posts::created_at.ge(floor));
            page_query = page_query.filter(posts::created_at.ge(floor));
        }

        let total: i64 = count_query.count().get_result(conn).await?;

        let page = filter.page.max(1);
        let offset = ((page - 1) * filter.page_size) as i64;
        let items = page_query
            .order(posts::created_at.desc())
            .limit(filter.page_size as i64)
            .offset(offset)
            .load(conn)
            .await?;

        Ok((items, total))
    }

    /// Posts the viewer has not liked yet, authored by public profiles or by
    /// profiles the viewer approvedly follows, excluding the viewer's own.
    pub async fn unseen_for_viewer(
        conn: &mut AsyncPgConnection,
        viewer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        let liked_posts = likes::table
            .filter(likes::liked_by.eq(viewer_id))
            .select(likes::post_id);

        let public_authors = users::table
            .filter(users::profile_type.eq(ProfileType::Public.as_str()))
            .select(users::id);

        let followed_authors = follows::table
            .filter(follows::follower_id.eq(viewer_id))
            .filter(follows::status.eq(FollowStatus::Approved.as_str()))
            .select(follows::following_id);

        posts::table
            .filter(posts::posted_by.ne(viewer_id))
            .filter(posts::id.ne_all(liked_posts))
            .filter(
                posts::posted_by
                    .eq_any(public_authors)
                    .or(posts::posted_by.eq_any(followed_authors)),
            )
            .order(posts::created_at.desc())
            .limit(limit)
            .load(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_created_within_floor() {
        let now = Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(
            CreatedWithin::ThisMonth.floor_from(now),
            Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            CreatedWithin::Last6Months.floor_from(now),
            Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            CreatedWithin::Last1Year.floor_from(now),
            Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            CreatedWithin::Last10Years.floor_from(now),
            Utc.with_ymd_and_hms(2015, 7, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_created_within_clamps_to_month_end() {
        // March 31 minus one month lands on February's last day
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 8, 0, 0).unwrap();
        assert_eq!(
            CreatedWithin::ThisMonth.floor_from(now),
            Utc.with_ymd_and_hms(2025, 2, 28, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_created_within_serde_names() {
        assert_eq!(
            serde_json::to_string(&CreatedWithin::ThisMonth).unwrap(),
            "\"this_month\""
        );
        assert_eq!(
            serde_json::from_str::<CreatedWithin>("\"last_6_months\"").unwrap(),
            CreatedWithin::Last6Months
        );
        assert_eq!(
            serde_json::from_str::<CreatedWithin>("\"last_1_year\"").unwrap(),
            CreatedWithin::Last1Year
        );
        assert_eq!(
            serde_json::from_str::<CreatedWithin>("\"last_10_years\"").unwrap(),
            CreatedWithin::Last10Years
        );
    }
}
