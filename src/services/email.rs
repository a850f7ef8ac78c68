// Email service: handlebars templates rendered and delivered through a
// Resend-style JSON API, with retry and backoff on transient failures.

use handlebars::Handlebars;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::app_config::EmailConfig;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration missing: {0}")]
    MissingConfig(&'static str),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Failed to send email: {0}")]
    SendError(String),

    #[error("Email provider rate limit exceeded")]
    RateLimitExceeded,

    #[error("Email provider unavailable")]
    ServiceUnavailable,
}

/// A rendered message ready for delivery
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Clone)]
pub struct EmailService {
    client: Client,
    config: EmailConfig,
    templates: Arc<Handlebars<'static>>,
    max_retries: u32,
    retry_delay: Duration,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        if config.api_key.is_empty() {
            return Err(EmailError::MissingConfig("EMAIL_API_KEY"));
        }

        let mut templates = Handlebars::new();
        Self::register_templates(&mut templates)?;

        Ok(Self {
            client: Client::new(),
            config,
            templates: Arc::new(templates),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        })
    }

    fn register_templates(templates: &mut Handlebars) -> Result<(), EmailError> {
        templates
            .register_template_string("otp", include_str!("../templates/email/otp.html"))
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        templates
            .register_template_string(
                "post_removed",
                include_str!("../templates/email/post_removed.html"),
            )
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        templates
            .register_template_string(
                "post_digest",
                include_str!("../templates/email/post_digest.html"),
            )
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        Ok(())
    }

    /// Send the password-reset otp code
    #[instrument(skip(self, code))]
    pub async fn send_otp_email(
        &self,
        to_email: &str,
        code: &str,
        ttl_minutes: u64,
    ) -> Result<(), EmailError> {
        info!("Sending password reset otp to {}", to_email);

        let html = self
            .templates
            .render("otp", &json!({ "code": code, "ttl_minutes": ttl_minutes }))
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        self.send_with_retry(EmailMessage {
            to: to_email.to_string(),
            subject: "Your password reset code".to_string(),
            html,
        })
        .await
    }

    /// Notify a post author that moderation removed their post
    #[instrument(skip(self))]
    pub async fn send_post_removed_email(
        &self,
        to_email: &str,
        username: &str,
    ) -> Result<(), EmailError> {
        info!("Sending post removal notification to {}", to_email);

        let html = self
            .templates
            .render("post_removed", &json!({ "username": username }))
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        self.send_with_retry(EmailMessage {
            to: to_email.to_string(),
            subject: "Your post was removed".to_string(),
            html,
        })
        .await
    }

    /// Send the periodic digest of unseen posts
    #[instrument(skip(self, captions))]
    pub async fn send_post_digest_email(
        &self,
        to_email: &str,
        username: &str,
        captions: &[String],
    ) -> Result<(), EmailError> {
        let html = self
            .templates
            .render(
                "post_digest",
                &json!({ "username": username, "captions": captions }),
            )
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        self.send_with_retry(EmailMessage {
            to: to_email.to_string(),
            subject: "Posts you may have missed".to_string(),
            html,
        })
        .await
    }

    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let payload = json!({
            "from": format!("{} <{}>", self.config.from_name, self.config.from_email),
            "to": [message.to],
            "subject": message.subject,
            "html": message.html,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!("Email sent successfully");
                Ok(())
            },
            Ok(res) => {
                let status = res.status();
                let error_text = res
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                error!("Failed to send email. Status: {}, Error: {}", status, error_text);

                if status.as_u16() == 429 {
                    Err(EmailError::RateLimitExceeded)
                } else if status.is_server_error() {
                    Err(EmailError::ServiceUnavailable)
                } else {
                    Err(EmailError::SendError(format!(
                        "Email send failed with status {}: {}",
                        status, error_text
                    )))
                }
            },
            Err(e) => {
                error!("Network error while sending email: {:?}", e);
                Err(EmailError::SendError(format!("Network error: {}", e)))
            },
        }
    }

    async fn send_with_retry(&self, message: EmailMessage) -> Result<(), EmailError> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.send(message.clone()).await {
                Ok(()) => return Ok(()),
                Err(EmailError::RateLimitExceeded) => {
                    warn!("Email provider rate limit hit, not retrying");
                    return Err(EmailError::RateLimitExceeded);
                },
                Err(e) => {
                    warn!("Email send attempt {} failed: {:?}", attempt, e);
                    last_error = Some(e);

                    if attempt < self.max_retries {
                        let exp = 2_u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
                        let delay = self
                            .retry_delay
                            .checked_mul(exp)
                            .unwrap_or(Duration::from_secs(60))
                            .min(Duration::from_secs(60));
                        tokio::time::sleep(delay).await;
                    }
                },
            }
        }

        Err(last_error
            .unwrap_or_else(|| EmailError::SendError("Failed after maximum retries".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            api_key: "test_key".to_string(),
            api_url: "https://api.resend.com/emails".to_string(),
            from_email: "noreply@test.app".to_string(),
            from_name: "Test App".to_string(),
        }
    }

    #[test]
    fn test_email_service_creation() {
        assert!(EmailService::new(test_config()).is_ok());
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let mut config = test_config();
        config.api_key = String::new();
        assert!(matches!(
            EmailService::new(config),
            Err(EmailError::MissingConfig("EMAIL_API_KEY"))
        ));
    }

    #[test]
    fn test_templates_render() {
        let service = EmailService::new(test_config()).expect("service");

        let html = service
            .templates
            .render("otp", &json!({ "code": "123456", "ttl_minutes": 5 }))
            .expect("render otp");
        assert!(html.contains("123456"));

        let html = service
            .templates
            .render("post_removed", &json!({ "username": "ferris" }))
            .expect("render post_removed");
        assert!(html.contains("ferris"));

        let html = service
            .templates
            .render(
                "post_digest",
                &json!({ "username": "ferris", "captions": ["first", "second"] }),
            )
            .expect("render post_digest");
        assert!(html.contains("first"));
        assert!(html.contains("second"));
    }
}
