// Authentication handlers: registration, login, refresh, the otp-based
// password-reset flow, and GitHub OAuth login.

use axum::{
    extract::{ConnectInfo, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;
use validator::Validate;

use crate::{
    app::AppState,
    models::Role,
    services::rate_limit::RateLimitConfig,
    utils::{error_strings, ApiError, ApiResponse},
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 320, message = "Email must be less than 320 characters"))]
    pub email: String,

    pub password: String,

    /// user (default) or admin
    #[serde(default = "default_role")]
    pub role: String,

    /// Optional profile username; derived from the email local-part when
    /// omitted. Ignored for admin registrations.
    pub username: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResetPasswordRequest {
    pub otp_token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct GitCallbackQuery {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterData {
    pub id: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Per-IP throttle for the sensitive unauthenticated endpoints. Errors from
/// the limiter itself are logged and fail open.
async fn enforce_ip_limit(
    state: &AppState,
    addr: &SocketAddr,
    key_prefix: &str,
    config: RateLimitConfig,
) -> Option<Response> {
    if !state.config.security.enable_rate_limiting {
        return None;
    }

    let key = format!("{}:ip:{}", key_prefix, addr.ip());
    match state.rate_limit_service.check_rate_limit(&key, &config).await {
        Ok(status) if !status.allowed => {
            let retry_after = status.retry_after.unwrap_or(config.block_duration);
            Some(
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(serde_json::json!({
                        "message": format!("Too many requests! Retry after {} seconds.", retry_after),
                        "success": false,
                        "data": {},
                    })),
                )
                    .into_response(),
            )
        },
        Err(e) => {
            tracing::warn!("Rate limit check failed for {}: {}", key, e);
            None
        },
        _ => None,
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// POST /register/ - Create a base identity and its profile
pub async fn register(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    if let Some(limited) = enforce_ip_limit(
        &state,
        &addr,
        "register",
        RateLimitConfig::registration(&state.config.security),
    )
    .await
    {
        return limited;
    }

    if let Err(e) = req.validate() {
        return ApiError::from(e).into_response();
    }

    let role = match Role::from_str(&req.role) {
        Ok(role) => role,
        Err(e) => return ApiError::validation(e).into_response(),
    };

    match state
        .account_service
        .register(&req.email, &req.password, role, req.username)
        .await
    {
        Ok(base_user) => (
            StatusCode::CREATED,
            Json(ApiResponse::with_message(
                "New user created",
                RegisterData {
                    id: base_user.id.to_string(),
                    email: base_user.email,
                    role: base_user.role,
                },
            )),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /login/ - Authenticate and return a token pair
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> Response {
    if let Some(limited) = enforce_ip_limit(
        &state,
        &addr,
        "login",
        RateLimitConfig::login(&state.config.security),
    )
    .await
    {
        return limited;
    }

    match state.account_service.login(&req.email, &req.password).await {
        Ok((base_user, tokens)) => Json(ApiResponse::new(LoginData {
            id: base_user.id.to_string(),
            email: base_user.email,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "bearer".to_string(),
            expires_in: tokens.expires_in,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /refresh/ - Exchange a refresh token for a fresh pair
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Response {
    match state.account_service.refresh(&req.refresh_token).await {
        Ok(tokens) => Json(ApiResponse::new(TokenData {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "bearer".to_string(),
            expires_in: tokens.expires_in,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /forgot-password/ - Issue an otp; silent for unknown emails
pub async fn forgot_password(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Response {
    if let Some(limited) = enforce_ip_limit(
        &state,
        &addr,
        "forgot-password",
        RateLimitConfig::forgot_password(&state.config.security),
    )
    .await
    {
        return limited;
    }

    if let Err(e) = req.validate() {
        return ApiError::from(e).into_response();
    }

    match state.account_service.forgot_password(&req.email).await {
        Ok(()) => Json(ApiResponse::with_message(
            "If the account exists, an otp has been sent to its email",
            serde_json::json!({}),
        ))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /verify-otp/ - Verify the otp and return a reset token
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Response {
    match state.account_service.verify_otp(&req.email, &req.otp).await {
        Ok(otp_token) => Json(ApiResponse::new(serde_json::json!({
            "otp_token": otp_token,
        })))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /reset-password/ - Consume the reset token and set a new password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Response {
    match state
        .account_service
        .reset_password(&req.otp_token, &req.new_password)
        .await
    {
        Ok(()) => Json(ApiResponse::with_message(
            "Password reset!",
            serde_json::json!({}),
        ))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /git-authenticate/ - Hand out the GitHub authorization URL
pub async fn git_authenticate(State(state): State<AppState>) -> Response {
    Json(ApiResponse::new(serde_json::json!({
        "url": state.oauth_service.authorize_url(),
    })))
    .into_response()
}

/// GET /git-callback/ - Complete GitHub login for the user
pub async fn git_callback(
    State(state): State<AppState>,
    Query(query): Query<GitCallbackQuery>,
) -> Response {
    let access_token = match state.oauth_service.exchange_code(&query.code).await {
        Ok(Some(token)) => token,
        Ok(None) => return ApiError::unauthorized(error_strings::INVALID_TOKEN).into_response(),
        Err(e) => return ApiError::internal(e.to_string()).into_response(),
    };

    let email = match state.oauth_service.fetch_user_email(&access_token).await {
        Ok(Some(email)) => email,
        Ok(None) => {
            return ApiError::not_found(error_strings::GIT_EMAIL_NOT_FOUND).into_response()
        },
        Err(e) => return ApiError::internal(e.to_string()).into_response(),
    };

    match state.account_service.oauth_login(&email).await {
        Ok((base_user, tokens)) => Json(ApiResponse::new(LoginData {
            id: base_user.id.to_string(),
            email: base_user.email,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "bearer".to_string(),
            expires_in: tokens.expires_in,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
