// GitHub OAuth login: authorize-URL construction, code exchange, and
// primary-email lookup against the GitHub API.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, instrument};

use crate::app_config::OauthConfig;

#[derive(Error, Debug)]
pub enum OauthError {
    #[error("OAuth configuration missing: {0}")]
    MissingConfig(&'static str),

    #[error("OAuth request failed: {0}")]
    Request(String),

    #[error("Code exchange rejected with status {0}")]
    ExchangeFailed(u16),
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

#[derive(Clone)]
pub struct GithubOauthService {
    client: Client,
    config: OauthConfig,
}

impl GithubOauthService {
    pub fn new(config: OauthConfig) -> Result<Self, OauthError> {
        if config.client_id.is_empty() {
            return Err(OauthError::MissingConfig("GIT_CLIENT_ID"));
        }
        if config.client_secret.is_empty() {
            return Err(OauthError::MissingConfig("GIT_CLIENT_SECRET"));
        }

        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    /// Authorization URL the client is redirected to
    pub fn authorize_url(&self) -> String {
        format!(
            "https://github.com/login/oauth/authorize?client_id={}&redirect_uri={}&scope=user:email",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
        )
    }

    /// Exchange the callback code for an access token
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<Option<String>, OauthError> {
        let payload = serde_json::json!({
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret,
            "code": code,
            "redirect_uri": self.config.redirect_uri,
        });

        let response = self
            .client
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| OauthError::Request(e.to_string()))?;

        if !response.status().is_success() {
            error!("OAuth code exchange failed: {}", response.status());
            return Err(OauthError::ExchangeFailed(response.status().as_u16()));
        }

        let body: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| OauthError::Request(e.to_string()))?;

        Ok(body.access_token)
    }

    /// Fetch the account's primary verified email
    #[instrument(skip(self, access_token))]
    pub async fn fetch_user_email(&self, access_token: &str) -> Result<Option<String>, OauthError> {
        let response = self
            .client
            .get(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "moments-backend")
            .send()
            .await
            .map_err(|e| OauthError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let emails: Vec<GithubEmail> = response
            .json()
            .await
            .map_err(|e| OauthError::Request(e.to_string()))?;

        Ok(pick_primary_email(emails))
    }
}

/// Prefer the primary verified email; fall back to any verified one
fn pick_primary_email(emails: Vec<GithubEmail>) -> Option<String> {
    let mut fallback = None;
    for entry in emails {
        if !entry.verified {
            continue;
        }
        if entry.primary {
            return Some(entry.email);
        }
        if fallback.is_none() {
            fallback = Some(entry.email);
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OauthConfig {
        OauthConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:8080/auth/git-callback/".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            api_url: "https://api.github.com/user/emails".to_string(),
        }
    }

    #[test]
    fn test_authorize_url() {
        let service = GithubOauthService::new(test_config()).expect("service");
        let url = service.authorize_url();
        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("scope=user%3Aemail") || url.contains("scope=user:email"));
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let mut config = test_config();
        config.client_id = String::new();
        assert!(matches!(
            GithubOauthService::new(config),
            Err(OauthError::MissingConfig("GIT_CLIENT_ID"))
        ));
    }

    #[test]
    fn test_pick_primary_email() {
        let emails = vec![
            GithubEmail {
                email: "secondary@x.com".to_string(),
                primary: false,
                verified: true,
            },
            GithubEmail {
                email: "main@x.com".to_string(),
                primary: true,
                verified: true,
            },
        ];
        assert_eq!(pick_primary_email(emails), Some("main@x.com".to_string()));

        let emails = vec![GithubEmail {
            email: "unverified@x.com".to_string(),
            primary: true,
            verified: false,
        }];
        assert_eq!(pick_primary_email(emails), None);
    }
}
