// Hosted checkout client for the payment processor.
// Creates subscription checkout sessions over the form-encoded REST API and
// verifies inbound webhook signatures (t/v1 HMAC-SHA256 scheme).

use reqwest::Client;
use ring::hmac;
use serde::Deserialize;
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{error, instrument};

use crate::app_config::PaymentConfig;
use crate::models::payment::SubscriptionInterval;

/// Maximum accepted webhook timestamp skew in seconds
pub const WEBHOOK_TOLERANCE_SECONDS: i64 = 300;

#[derive(Error, Debug)]
pub enum StripeError {
    #[error("Payment configuration missing: {0}")]
    MissingConfig(&'static str),

    #[error("Payment request failed: {0}")]
    Request(String),

    #[error("Payment API returned status {0}: {1}")]
    UnexpectedStatus(u16, String),

    #[error("Invalid webhook signature header")]
    InvalidSignatureHeader,

    #[error("Webhook signature mismatch")]
    SignatureMismatch,

    #[error("Webhook timestamp outside tolerance")]
    TimestampOutOfTolerance,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Created checkout session, as returned by the processor
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
    pub amount_total: Option<i64>,
}

/// Inbound webhook event envelope
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: CheckoutSessionObject,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: PaymentConfig,
}

impl StripeClient {
    pub fn new(config: PaymentConfig) -> Result<Self, StripeError> {
        if config.api_key.is_empty() {
            return Err(StripeError::MissingConfig("STRIPE_API_KEY"));
        }
        if config.webhook_secret.is_empty() {
            return Err(StripeError::MissingConfig("STRIPE_WEBHOOK_SECRET"));
        }

        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    /// Create a hosted checkout session for the given subscription interval,
    /// embedding the identity and interval as session metadata.
    #[instrument(skip(self), fields(interval = interval.as_str()))]
    pub async fn create_subscription_checkout(
        &self,
        customer_email: &str,
        user_id: &str,
        interval: SubscriptionInterval,
    ) -> Result<CheckoutSession, StripeError> {
        let unit_amount = interval.price_cents().to_string();
        let params: Vec<(&str, String)> = vec![
            ("mode", "subscription".to_string()),
            ("success_url", self.config.success_url.clone()),
            ("cancel_url", self.config.cancel_url.clone()),
            ("customer_email", customer_email.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            ("line_items[0][price_data][unit_amount]", unit_amount),
            (
                "line_items[0][price_data][product_data][name]",
                self.config.product_name.clone(),
            ),
            (
                "line_items[0][price_data][recurring][interval]",
                interval.billing_interval().to_string(),
            ),
            (
                "line_items[0][price_data][recurring][interval_count]",
                "1".to_string(),
            ),
            ("metadata[user_id]", user_id.to_string()),
            ("metadata[interval]", interval.as_str().to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| StripeError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            error!("Checkout session creation failed with status {}: {}", status, text);
            return Err(StripeError::UnexpectedStatus(status, text));
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::Request(e.to_string()))
    }

    /// Verify the webhook signature header against the shared secret and
    /// parse the event payload.
    pub fn verify_and_parse_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
        now_epoch: i64,
    ) -> Result<WebhookEvent, StripeError> {
        verify_webhook_signature(
            payload,
            signature_header,
            &self.config.webhook_secret,
            now_epoch,
        )?;

        serde_json::from_slice(payload).map_err(|e| StripeError::InvalidPayload(e.to_string()))
    }
}

/// Compute the v1 signature for a timestamped payload. Exposed so webhook
/// tests can construct valid headers.
pub fn webhook_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let mut signed = format!("{}.", timestamp).into_bytes();
    signed.extend_from_slice(payload);
    let tag = hmac::sign(&key, &signed);
    tag.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
}

/// Verify a `t=...,v1=...` signature header
pub fn verify_webhook_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now_epoch: i64,
) -> Result<(), StripeError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<String> = Vec::new();

    for part in signature_header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(value)) => {
                timestamp = value.parse().ok();
            },
            (Some("v1"), Some(value)) => {
                candidates.push(value.to_string());
            },
            _ => {},
        }
    }

    let timestamp = timestamp.ok_or(StripeError::InvalidSignatureHeader)?;
    if candidates.is_empty() {
        return Err(StripeError::InvalidSignatureHeader);
    }

    if (now_epoch - timestamp).abs() > WEBHOOK_TOLERANCE_SECONDS {
        return Err(StripeError::TimestampOutOfTolerance);
    }

    let expected = webhook_signature(secret, timestamp, payload);
    for candidate in candidates {
        if expected
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .unwrap_u8()
            == 1
        {
            return Ok(());
        }
    }

    Err(StripeError::SignatureMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"type":"checkout.session.completed"}"#;

    fn header_for(timestamp: i64) -> String {
        format!(
            "t={},v1={}",
            timestamp,
            webhook_signature(SECRET, timestamp, PAYLOAD)
        )
    }

    #[test]
    fn test_valid_signature_accepted() {
        let now = 1_750_000_000;
        let header = header_for(now);
        assert!(verify_webhook_signature(PAYLOAD, &header, SECRET, now).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = 1_750_000_000;
        let header = header_for(now);
        assert!(matches!(
            verify_webhook_signature(PAYLOAD, &header, "whsec_other", now),
            Err(StripeError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = 1_750_000_000;
        let header = header_for(now);
        assert!(matches!(
            verify_webhook_signature(b"{}", &header, SECRET, now),
            Err(StripeError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let now = 1_750_000_000;
        let header = header_for(now - WEBHOOK_TOLERANCE_SECONDS - 1);
        assert!(matches!(
            verify_webhook_signature(PAYLOAD, &header, SECRET, now),
            Err(StripeError::TimestampOutOfTolerance)
        ));
    }

    #[test]
    fn test_malformed_header_rejected() {
        let now = 1_750_000_000;
        assert!(matches!(
            verify_webhook_signature(PAYLOAD, "v1=abc", SECRET, now),
            Err(StripeError::InvalidSignatureHeader)
        ));
        assert!(matches!(
            verify_webhook_signature(PAYLOAD, "t=123", SECRET, now),
            Err(StripeError::InvalidSignatureHeader)
        ));
    }

    #[test]
    fn test_event_parsing() {
        let payload = br#"{
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "metadata": {"user_id": "u-1", "interval": "monthly"}
                }
            }
        }"#;

        let event: WebhookEvent = serde_json::from_slice(payload).expect("parse");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.data.object.id, "cs_test_123");
        assert_eq!(
            event.data.object.metadata.get("interval"),
            Some(&"monthly".to_string())
        );
    }
}
