// Payment models: transactions tracking checkout sessions and the
// subscription row created once a transaction completes.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::{subscriptions, transactions};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Processing,
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Processing => "processing",
            TransactionStatus::Completed => "completed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(TransactionStatus::Processing),
            "completed" => Ok(TransactionStatus::Completed),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

/// Billing interval with its fixed price lookup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionInterval {
    Daily,
    Monthly,
    Yearly,
}

impl SubscriptionInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionInterval::Daily => "daily",
            SubscriptionInterval::Monthly => "monthly",
            SubscriptionInterval::Yearly => "yearly",
        }
    }

    /// Price in cents for one billing period
    pub fn price_cents(&self) -> i32 {
        match self {
            SubscriptionInterval::Daily => 199,
            SubscriptionInterval::Monthly => 999,
            SubscriptionInterval::Yearly => 9999,
        }
    }

    /// Billing interval name understood by the checkout API
    pub fn billing_interval(&self) -> &'static str {
        match self {
            SubscriptionInterval::Daily => "day",
            SubscriptionInterval::Monthly => "month",
            SubscriptionInterval::Yearly => "year",
        }
    }
}

impl FromStr for SubscriptionInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(SubscriptionInterval::Daily),
            "monthly" => Ok(SubscriptionInterval::Monthly),
            "yearly" => Ok(SubscriptionInterval::Yearly),
            _ => Err(format!("Invalid subscription interval: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Transaction {
    pub id: Uuid,
    /// The payment processor's checkout-session id
    pub payment_id: String,
    pub user_id: Uuid,
    pub amount: i32,
    pub service_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewTransaction {
    pub payment_id: String,
    pub user_id: Uuid,
    pub amount: i32,
    pub service_type: String,
    pub status: String,
}

impl Transaction {
    pub fn status_enum(&self) -> TransactionStatus {
        TransactionStatus::from_str(&self.status).unwrap_or_else(|e| {
            tracing::warn!(
                "Invalid transaction status '{}' on {}: {}",
                self.status,
                self.id,
                e
            );
            TransactionStatus::Processing
        })
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_transaction: NewTransaction,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(transactions::table)
            .values(&new_transaction)
            .get_result(conn)
            .await
    }

    pub async fn find_by_payment_id(
        conn: &mut AsyncPgConnection,
        payment: &str,
    ) -> Result<Option<Self>, diesel::result::Error> {
        transactions::table
            .filter(transactions::payment_id.eq(payment))
            .first(conn)
            .await
            .optional()
    }

    pub async fn mark_completed(
        conn: &mut AsyncPgConnection,
        transaction_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        diesel::update(transactions::table.find(transaction_id))
            .set((
                transactions::status.eq(TransactionStatus::Completed.as_str()),
                transactions::modified_at.eq(Some(Utc::now())),
            ))
            .get_result(conn)
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Subscription {
    pub id: Uuid,
    pub transaction_id: Option<Uuid>,
    pub user_id: Uuid,
    pub interval: String,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct NewSubscription {
    pub transaction_id: Option<Uuid>,
    pub user_id: Uuid,
    pub interval: String,
}

impl Subscription {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_subscription: NewSubscription,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(subscriptions::table)
            .values(&new_subscription)
            .get_result(conn)
            .await
    }

    pub async fn find_by_user_id(
        conn: &mut AsyncPgConnection,
        user: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        subscriptions::table
            .filter(subscriptions::user_id.eq(user))
            .first(conn)
            .await
            .optional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_price_table() {
        assert_eq!(SubscriptionInterval::Daily.price_cents(), 199);
        assert_eq!(SubscriptionInterval::Monthly.price_cents(), 999);
        assert_eq!(SubscriptionInterval::Yearly.price_cents(), 9999);
    }

    #[test]
    fn test_interval_billing_names() {
        assert_eq!(SubscriptionInterval::Daily.billing_interval(), "day");
        assert_eq!(SubscriptionInterval::Monthly.billing_interval(), "month");
        assert_eq!(SubscriptionInterval::Yearly.billing_interval(), "year");
    }

    #[test]
    fn test_interval_round_trip() {
        for interval in [
            SubscriptionInterval::Daily,
            SubscriptionInterval::Monthly,
            SubscriptionInterval::Yearly,
        ] {
            assert_eq!(
                SubscriptionInterval::from_str(interval.as_str()),
                Ok(interval)
            );
        }
        assert!(SubscriptionInterval::from_str("weekly").is_err());
    }

    #[test]
    fn test_transaction_status_round_trip() {
        assert_eq!(
            TransactionStatus::from_str("processing"),
            Ok(TransactionStatus::Processing)
        );
        assert_eq!(
            TransactionStatus::from_str("completed"),
            Ok(TransactionStatus::Completed)
        );
        assert!(TransactionStatus::from_str("failed").is_err());
    }
}
