// Subscription/payment flow: checkout creation, webhook completion, and the
// paid-access gate used before ad-post creation.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::{
    BaseUser, NewSubscription, NewTransaction, Subscription, SubscriptionInterval, Transaction,
};
use crate::services::profile::require_profile;
use crate::services::stripe::{StripeClient, StripeError};
use crate::utils::error_strings;
use crate::utils::ApiError;

/// Event the webhook endpoint completes transactions on
const CHECKOUT_COMPLETED_EVENT: &str = "checkout.session.completed";

pub struct PaymentService {
    pool: DieselPool,
    stripe: Arc<StripeClient>,
}

impl From<StripeError> for ApiError {
    fn from(error: StripeError) -> Self {
        match error {
            StripeError::InvalidSignatureHeader
            | StripeError::SignatureMismatch
            | StripeError::TimestampOutOfTolerance => {
                ApiError::unauthorized(error_strings::INVALID_TOKEN)
            },
            StripeError::InvalidPayload(msg) => ApiError::bad_request(msg),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl PaymentService {
    pub fn new(pool: DieselPool, stripe: Arc<StripeClient>) -> Self {
        Self { pool, stripe }
    }

    /// Create a hosted checkout session for the caller and record a
    /// processing transaction keyed by the session id.
    pub async fn subscribe(
        &self,
        base_user_id: Uuid,
        caller_is_admin: bool,
        interval: SubscriptionInterval,
    ) -> Result<String, ApiError> {
        if caller_is_admin {
            return Err(ApiError::forbidden(error_strings::ADMIN_NOT_ALLOWED));
        }

        let mut conn = self.pool.get().await?;
        let user = require_profile(&mut conn, base_user_id).await?;

        if Subscription::find_by_user_id(&mut conn, user.id).await?.is_some() {
            return Err(ApiError::bad_request(
                error_strings::SUBSCRIPTION_ALREADY_CREATED,
            ));
        }

        let base_user = BaseUser::find_by_id(&mut conn, user.base_user_id).await?;

        let session = self
            .stripe
            .create_subscription_checkout(&base_user.email, &user.id.to_string(), interval)
            .await?;

        let amount = session
            .amount_total
            .map(|cents| cents as i32)
            .unwrap_or_else(|| interval.price_cents());

        Transaction::create(
            &mut conn,
            NewTransaction {
                payment_id: session.id.clone(),
                user_id: user.id,
                amount,
                service_type: "subscription".to_string(),
                status: crate::models::TransactionStatus::Processing.as_str().to_string(),
            },
        )
        .await?;

        Ok(session.url)
    }

    /// Complete a checkout from the processor's webhook: verify the
    /// signature, flip the transaction, create the subscription row.
    pub async fn complete_checkout(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<Subscription, ApiError> {
        let event = self
            .stripe
            .verify_and_parse_webhook(payload, signature_header, Utc::now().timestamp())?;

        if event.event_type != CHECKOUT_COMPLETED_EVENT {
            return Err(ApiError::bad_request(format!(
                "Unhandled event type: {}",
                event.event_type
            )));
        }

        let session = event.data.object;

        let user_id: Uuid = session
            .metadata
            .get("user_id")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| ApiError::bad_request("Missing user_id in session metadata"))?;

        let interval: SubscriptionInterval = session
            .metadata
            .get("interval")
            .and_then(|i| i.parse().ok())
            .ok_or_else(|| ApiError::bad_request("Missing interval in session metadata"))?;

        let mut conn = self.pool.get().await?;

        let transaction = Transaction::find_by_payment_id(&mut conn, &session.id)
            .await?
            .ok_or_else(|| ApiError::bad_request(error_strings::TRANSACTION_NOT_CREATED))?;

        let transaction = Transaction::mark_completed(&mut conn, transaction.id).await?;

        Subscription::create(
            &mut conn,
            NewSubscription {
                transaction_id: Some(transaction.id),
                user_id,
                interval: interval.as_str().to_string(),
            },
        )
        .await
        .map_err(ApiError::from)
    }

    /// Gate for paid features: fails unless the profile has an active
    /// (non-cancelled) subscription.
    pub async fn check_if_user_paid(&self, base_user_id: Uuid) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let user = require_profile(&mut conn, base_user_id).await?;

        let subscription = Subscription::find_by_user_id(&mut conn, user.id).await?;
        match subscription {
            Some(subscription) if !subscription.is_cancelled => Ok(()),
            _ => Err(ApiError::bad_request(error_strings::USER_NOT_SUBSCRIBED)),
        }
    }
}
