// Bearer-token middleware for protected routes.
// Validates the access token, checks the required claims, and injects
// AuthenticatedUser into request extensions.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::{app::AppState, middleware::auth::AuthenticatedUser, services::jwt::JwtError};
use crate::utils::error_strings;

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "message": message,
            "success": false,
            "data": {},
        })),
    )
        .into_response()
}

/// Validate the Authorization header and forward the request with the
/// caller's identity attached.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return unauthorized("Missing or invalid authorization header"),
    };

    match app_state.jwt_service.validate_access_token(token) {
        Ok(claims) => {
            // Claims deserialization already guarantees id/role/exp exist;
            // the id must additionally parse as an identity id.
            let base_user_id: Uuid = match claims.id.parse() {
                Ok(id) => id,
                Err(_) => return unauthorized(error_strings::INVALID_TOKEN),
            };

            let auth_user = AuthenticatedUser {
                base_user_id,
                role: claims.role,
                exp: claims.exp,
            };

            request.extensions_mut().insert(auth_user);
            next.run(request).await
        },
        Err(JwtError::TokenExpired) => unauthorized(error_strings::ACCESS_TOKEN_EXPIRED),
        Err(e) => {
            tracing::warn!("JWT validation failed: {}", e);
            unauthorized(error_strings::INVALID_TOKEN)
        },
    }
}

/// Extractor so handlers can take AuthenticatedUser directly
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "message": "Authentication required",
                        "success": false,
                        "data": {},
                    })),
                )
            })
    }
}
