// Authenticated caller extracted from a validated bearer token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller identity injected into request extensions by the bearer middleware
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub base_user_id: Uuid,
    pub role: String,
    pub exp: u64,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
