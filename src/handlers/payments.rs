// Payment handlers: checkout creation and the webhook completion endpoint.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::SubscriptionInterval,
    utils::{ApiError, ApiResponse},
};

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub interval: SubscriptionInterval,
}

/// GET /payment/subscribe/ - Create a checkout session for the caller
pub async fn subscribe(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Query(query): Query<SubscribeQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let url = state
        .payment_service
        .subscribe(caller.base_user_id, caller.is_admin(), query.interval)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Checkout",
        serde_json::json!({ "url": url }),
    )))
}

/// GET /payment/success/ - Static landing for completed checkouts
pub async fn success() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::with_message(
        "Payment successful!",
        serde_json::json!({}),
    ))
}

/// GET /payment/cancel/ - Static landing for cancelled checkouts
pub async fn cancel() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::with_message(
        "Payment cancelled!",
        serde_json::json!({}),
    ))
}

/// POST /payment/webhook/checkout/success/ - Completion webhook from the
/// payment processor
pub async fn checkout_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("Missing Stripe-Signature header"))?;

    let subscription = state
        .payment_service
        .complete_checkout(&body, signature)
        .await?;

    Ok(Json(ApiResponse::new(serde_json::json!({
        "id": subscription.id,
        "user_id": subscription.user_id,
        "interval": subscription.interval,
        "transaction_id": subscription.transaction_id,
    }))))
}
