// One-time passcode model. At most one live code per identity: issuing a new
// code replaces the previous row.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::otps;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = otps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Otp {
    pub id: Uuid,
    pub base_user_id: Uuid,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = otps)]
pub struct NewOtp {
    pub base_user_id: Uuid,
    pub code: String,
}

impl Otp {
    pub async fn find_by_base_user_id(
        conn: &mut AsyncPgConnection,
        base_user_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        otps::table
            .filter(otps::base_user_id.eq(base_user_id))
            .first(conn)
            .await
            .optional()
    }

    /// Delete any existing code for the identity and insert a fresh one
    pub async fn replace(
        conn: &mut AsyncPgConnection,
        new_otp: NewOtp,
    ) -> Result<Self, diesel::result::Error> {
        diesel::delete(otps::table.filter(otps::base_user_id.eq(new_otp.base_user_id)))
            .execute(conn)
            .await?;

        diesel::insert_into(otps::table)
            .values(&new_otp)
            .get_result(conn)
            .await
    }

    pub async fn delete_for_base_user(
        conn: &mut AsyncPgConnection,
        base_user_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(otps::table.filter(otps::base_user_id.eq(base_user_id)))
            .execute(conn)
            .await
    }
}

/// Generate a random 6-digit numeric code
pub fn generate_otp_code() -> String {
    use rand::Rng;
    let code: u32 = rand::thread_rng().gen_range(100000..=999999);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_code_shape() {
        for _ in 0..100 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let num: u32 = code.parse().expect("numeric code");
            assert!((100000..=999999).contains(&num));
        }
    }
}
