// Webhook signature verification and event parsing for the checkout
// completion endpoint.

use moments_backend::app_config::PaymentConfig;
use moments_backend::services::stripe::{
    verify_webhook_signature, webhook_signature, StripeClient, StripeError,
    WEBHOOK_TOLERANCE_SECONDS,
};

const SECRET: &str = "whsec_integration_secret";

fn payment_config() -> PaymentConfig {
    PaymentConfig {
        api_key: "sk_test_key".to_string(),
        api_url: "https://api.stripe.com/v1".to_string(),
        webhook_secret: SECRET.to_string(),
        product_name: "Moments Subscription".to_string(),
        success_url: "http://localhost:8080/payment/success/".to_string(),
        cancel_url: "http://localhost:8080/payment/cancel/".to_string(),
    }
}

fn signed_header(payload: &[u8], timestamp: i64) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        webhook_signature(SECRET, timestamp, payload)
    )
}

#[test]
fn test_client_verifies_and_parses_completed_checkout() {
    let client = StripeClient::new(payment_config()).expect("client");
    let now = 1_755_000_000;

    let payload = br#"{
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_abc",
                "metadata": {
                    "user_id": "3f6cbb48-55b5-4d3c-8e9a-111122223333",
                    "interval": "yearly"
                }
            }
        }
    }"#;

    let event = client
        .verify_and_parse_webhook(payload, &signed_header(payload, now), now)
        .expect("verify and parse");

    assert_eq!(event.event_type, "checkout.session.completed");
    assert_eq!(event.data.object.id, "cs_test_abc");
    assert_eq!(
        event.data.object.metadata.get("interval").map(String::as_str),
        Some("yearly")
    );
}

#[test]
fn test_client_rejects_bad_signature() {
    let client = StripeClient::new(payment_config()).expect("client");
    let now = 1_755_000_000;

    let payload = br#"{"type":"checkout.session.completed","data":{"object":{"id":"cs_1"}}}"#;
    let header = format!("t={},v1={}", now, "0".repeat(64));

    assert!(matches!(
        client.verify_and_parse_webhook(payload, &header, now),
        Err(StripeError::SignatureMismatch)
    ));
}

#[test]
fn test_signature_expires_with_tolerance() {
    let now = 1_755_000_000;
    let payload = b"{}";

    let fresh = signed_header(payload, now - WEBHOOK_TOLERANCE_SECONDS);
    assert!(verify_webhook_signature(payload, &fresh, SECRET, now).is_ok());

    let stale = signed_header(payload, now - WEBHOOK_TOLERANCE_SECONDS - 1);
    assert!(matches!(
        verify_webhook_signature(payload, &stale, SECRET, now),
        Err(StripeError::TimestampOutOfTolerance)
    ));
}

#[test]
fn test_multiple_v1_candidates_accept_any_match() {
    let now = 1_755_000_000;
    let payload = b"{\"ok\":true}";

    let header = format!(
        "t={},v1={},v1={}",
        now,
        "f".repeat(64),
        webhook_signature(SECRET, now, payload)
    );

    assert!(verify_webhook_signature(payload, &header, SECRET, now).is_ok());
}

#[test]
fn test_missing_webhook_secret_rejected_at_construction() {
    let mut config = payment_config();
    config.webhook_secret = String::new();
    assert!(matches!(
        StripeClient::new(config),
        Err(StripeError::MissingConfig("STRIPE_WEBHOOK_SECRET"))
    ));
}
