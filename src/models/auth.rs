// Token claims structures.
// Access and refresh tokens carry the identity id and role; the reset token
// additionally embeds the otp code it was issued against.

use serde::{Deserialize, Serialize};

/// Access token claims. `id`, `role` and `exp` are all required by the
/// bearer middleware.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Base identity id
    pub id: String,

    /// Account role (user / admin)
    pub role: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}

/// Refresh token claims; `token_type` guards against an access token being
/// replayed on the refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshTokenClaims {
    pub id: String,
    pub role: String,
    pub token_type: String,
    pub iat: u64,
    pub exp: u64,
}

/// Password-reset token claims, issued after a successful otp verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetTokenClaims {
    pub id: String,
    pub otp: String,
    pub iat: u64,
    pub exp: u64,
}

impl AccessTokenClaims {
    pub fn new(id: String, role: String, issued_at: u64, expires_at: u64) -> Self {
        Self {
            id,
            role,
            iat: issued_at,
            exp: expires_at,
        }
    }
}

impl RefreshTokenClaims {
    pub fn new(id: String, role: String, issued_at: u64, expires_at: u64) -> Self {
        Self {
            id,
            role,
            token_type: "refresh".to_string(),
            iat: issued_at,
            exp: expires_at,
        }
    }
}

impl ResetTokenClaims {
    pub fn new(id: String, otp: String, issued_at: u64, expires_at: u64) -> Self {
        Self {
            id,
            otp,
            iat: issued_at,
            exp: expires_at,
        }
    }
}
