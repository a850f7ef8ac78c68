// JWT token service: access/refresh pairs plus the short-lived
// password-reset token issued after otp verification. HS256 throughout,
// separate keys for access and refresh/reset tokens.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::app_config::JwtSettings;
use crate::models::auth::{AccessTokenClaims, RefreshTokenClaims, ResetTokenClaims};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Wrong token type")]
    WrongTokenType,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidSignature => JwtError::InvalidToken,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::MissingRequiredClaim(_) => JwtError::MalformedToken,
            _ => JwtError::EncodingError(err.to_string()),
        }
    }
}

/// JWT configuration with separate keys per token family
#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_expiry: u64,
    pub refresh_token_expiry: u64,
    pub reset_token_expiry: u64,
    pub algorithm: Algorithm,
    pub issuer: String,

    pub access_encoding_key: EncodingKey,
    pub access_decoding_key: DecodingKey,

    pub refresh_encoding_key: EncodingKey,
    pub refresh_decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("reset_token_expiry", &self.reset_token_expiry)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("access_encoding_key", &"<redacted>")
            .field("access_decoding_key", &"<redacted>")
            .field("refresh_encoding_key", &"<redacted>")
            .field("refresh_decoding_key", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    fn build_from_params(
        access_secret: &str,
        refresh_secret: &str,
        access_expiry: u64,
        refresh_expiry: u64,
        reset_expiry: u64,
        issuer: String,
    ) -> Self {
        JwtConfig {
            access_token_expiry: access_expiry,
            refresh_token_expiry: refresh_expiry,
            reset_token_expiry: reset_expiry,
            algorithm: Algorithm::HS256,
            issuer,
            access_encoding_key: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding_key: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding_key: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    /// Build from the application's JWT settings
    pub fn from_settings(settings: &JwtSettings) -> Self {
        Self::build_from_params(
            &settings.access_secret,
            &settings.refresh_secret,
            settings.access_expiry,
            settings.refresh_expiry,
            settings.reset_expiry,
            settings.issuer.clone(),
        )
    }

    /// Deterministic config for tests, no environment required
    pub fn for_test() -> Self {
        Self::build_from_params(
            "test-access-secret-hs256-minimum-32-chars!",
            "test-refresh-secret-hs256-minimum-32-chars",
            3600,
            604800,
            600,
            "test.moments.app".to_string(),
        )
    }
}

/// Generated token pair handed back on login/refresh
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.config.algorithm);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0; // No leeway for expiry validation
        validation
    }

    /// Generate an access token for the identity
    pub fn generate_access_token(&self, id: &str, role: &str) -> Result<String, JwtError> {
        let now = Self::now();
        let claims = AccessTokenClaims::new(
            id.to_string(),
            role.to_string(),
            now,
            now + self.config.access_token_expiry,
        );

        encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.config.access_encoding_key,
        )
        .map_err(JwtError::from)
    }

    /// Generate a refresh token for the identity
    pub fn generate_refresh_token(&self, id: &str, role: &str) -> Result<String, JwtError> {
        let now = Self::now();
        let claims = RefreshTokenClaims::new(
            id.to_string(),
            role.to_string(),
            now,
            now + self.config.refresh_token_expiry,
        );

        encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.config.refresh_encoding_key,
        )
        .map_err(JwtError::from)
    }

    /// Generate the access + refresh pair returned on login
    pub fn generate_token_pair(&self, id: &str, role: &str) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(id, role)?,
            refresh_token: self.generate_refresh_token(id, role)?,
            expires_in: self.config.access_token_expiry,
        })
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let data = decode::<AccessTokenClaims>(
            token,
            &self.config.access_decoding_key,
            &self.validation(),
        )?;
        Ok(data.claims)
    }

    /// Validate a refresh token, rejecting access tokens replayed here
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, JwtError> {
        let data = decode::<RefreshTokenClaims>(
            token,
            &self.config.refresh_decoding_key,
            &self.validation(),
        )?;
        if data.claims.token_type != "refresh" {
            return Err(JwtError::WrongTokenType);
        }
        Ok(data.claims)
    }

    /// Generate the short-lived reset token embedding the verified otp code
    pub fn generate_reset_token(&self, id: &str, otp: &str) -> Result<String, JwtError> {
        let now = Self::now();
        let claims = ResetTokenClaims::new(
            id.to_string(),
            otp.to_string(),
            now,
            now + self.config.reset_token_expiry,
        );

        encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.config.refresh_encoding_key,
        )
        .map_err(JwtError::from)
    }

    /// Validate a reset token. Expiry, signature and shape failures map to
    /// distinct error variants so the reset endpoint can report them apart.
    pub fn validate_reset_token(&self, token: &str) -> Result<ResetTokenClaims, JwtError> {
        let data = decode::<ResetTokenClaims>(
            token,
            &self.config.refresh_decoding_key,
            &self.validation(),
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig::for_test())
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = service();
        let token = service
            .generate_access_token("user-1", "user")
            .expect("generate");
        let claims = service.validate_access_token(&token).expect("validate");

        assert_eq!(claims.id, "user-1");
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let service = service();
        let token = service
            .generate_refresh_token("user-1", "admin")
            .expect("generate");
        let claims = service.validate_refresh_token(&token).expect("validate");

        assert_eq!(claims.role, "admin");
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = service();
        let token = service
            .generate_access_token("user-1", "user")
            .expect("generate");

        // Signed with the access key and missing token_type: never valid here
        let err = service.validate_refresh_token(&token).unwrap_err();
        assert!(matches!(
            err,
            JwtError::InvalidToken | JwtError::MalformedToken
        ));
    }

    #[test]
    fn test_expired_access_token() {
        let service = service();
        let config = JwtConfig::for_test();
        let now = JwtService::now();

        let claims = AccessTokenClaims::new("user-1".to_string(), "user".to_string(), now - 120, now - 60);
        let token = encode(
            &Header::new(config.algorithm),
            &claims,
            &config.access_encoding_key,
        )
        .expect("encode");

        assert_eq!(
            service.validate_access_token(&token).unwrap_err(),
            JwtError::TokenExpired
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = service();
        let other = JwtService::new(JwtConfig::build_from_params(
            "another-access-secret-that-is-32-chars!!",
            "another-refresh-secret-that-is-32-chars!",
            3600,
            604800,
            600,
            "test.moments.app".to_string(),
        ));

        let token = other
            .generate_access_token("user-1", "user")
            .expect("generate");
        assert_eq!(
            service.validate_access_token(&token).unwrap_err(),
            JwtError::InvalidToken
        );
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = service();
        assert_eq!(
            service.validate_access_token("definitely-not-a-jwt").unwrap_err(),
            JwtError::MalformedToken
        );
    }

    #[test]
    fn test_reset_token_round_trip() {
        let service = service();
        let token = service
            .generate_reset_token("user-1", "123456")
            .expect("generate");
        let claims = service.validate_reset_token(&token).expect("validate");

        assert_eq!(claims.id, "user-1");
        assert_eq!(claims.otp, "123456");
    }

    #[test]
    fn test_reset_token_expiry_distinct_from_bad_signature() {
        let service = service();
        let config = JwtConfig::for_test();
        let now = JwtService::now();

        // Expired reset token
        let claims =
            ResetTokenClaims::new("user-1".to_string(), "123456".to_string(), now - 1200, now - 600);
        let expired = encode(
            &Header::new(config.algorithm),
            &claims,
            &config.refresh_encoding_key,
        )
        .expect("encode");
        assert_eq!(
            service.validate_reset_token(&expired).unwrap_err(),
            JwtError::TokenExpired
        );

        // Well-formed but signed with the wrong secret
        let wrong_key = EncodingKey::from_secret(b"wrong-secret-wrong-secret-wrong-secret!!");
        let claims =
            ResetTokenClaims::new("user-1".to_string(), "123456".to_string(), now, now + 600);
        let forged = encode(&Header::new(config.algorithm), &claims, &wrong_key).expect("encode");
        assert_eq!(
            service.validate_reset_token(&forged).unwrap_err(),
            JwtError::InvalidToken
        );
    }
}
