// Uniform API error taxonomy.
// Every business-rule violation is a typed variant here; handlers propagate
// with `?` and the envelope rendering happens once in `IntoResponse`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    /// Convert to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {}", self);
        }

        let body = Json(json!({
            "message": self.to_string(),
            "success": false,
            "data": {},
        }));

        (status, body).into_response()
    }
}

/// Matches the driver's unique-violation detail, e.g.
/// `Key (username)=(ferris) already exists.`
static UNIQUE_DETAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Key \((?P<field>[^)]+)\)=\((?P<value>[^)]*)\)").expect("valid unique-detail regex")
});

/// Map a unique-constraint violation to a human-readable conflict message.
/// Known domain constraints get their own wording; anything else is derived
/// from the driver's `Key (field)=(value)` detail text.
pub fn conflict_message(constraint: Option<&str>, detail: Option<&str>) -> String {
    match constraint {
        Some("follows_edge_key") => return "Follow request already exists!".to_string(),
        Some("likes_like_key") => return "Post already liked!".to_string(),
        Some("reported_posts_report_key") => return "Post already reported!".to_string(),
        Some("subscriptions_user_id_key") => return "Subscription already exists!".to_string(),
        _ => {},
    }

    if let Some(detail) = detail {
        if let Some(caps) = UNIQUE_DETAIL_RE.captures(detail) {
            return format!("{} {} already exists!", &caps["field"], &caps["value"]);
        }
    }

    "Already exists!".to_string()
}

impl From<diesel::result::Error> for ApiError {
    fn from(error: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match error {
            Error::NotFound => ApiError::NotFound("Resource not found!".to_string()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                ApiError::Conflict(conflict_message(info.constraint_name(), info.details()))
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for ApiError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        ApiError::Internal(format!("Database connection failed: {}", error))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut parts: Vec<String> = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors {
                let detail = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                parts.push(format!("{}: {}", field, detail));
            }
        }
        parts.sort();
        ApiError::Validation(parts.join("; "))
    }
}

impl From<redis::RedisError> for ApiError {
    fn from(error: redis::RedisError) -> Self {
        ApiError::Internal(format!("Cache error: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::unauthorized("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::validation("x").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_message_from_detail() {
        let msg = conflict_message(
            Some("base_users_email_key"),
            Some("Key (email)=(a@x.com) already exists."),
        );
        assert_eq!(msg, "email a@x.com already exists!");
    }

    #[test]
    fn test_conflict_message_named_constraints() {
        assert_eq!(
            conflict_message(Some("follows_edge_key"), None),
            "Follow request already exists!"
        );
        assert_eq!(
            conflict_message(Some("likes_like_key"), None),
            "Post already liked!"
        );
        assert_eq!(
            conflict_message(Some("reported_posts_report_key"), None),
            "Post already reported!"
        );
    }

    #[test]
    fn test_conflict_message_fallback() {
        assert_eq!(conflict_message(None, Some("no key shape here")), "Already exists!");
        assert_eq!(conflict_message(None, None), "Already exists!");
    }

    #[test]
    fn test_not_found_from_diesel() {
        let err: ApiError = diesel::result::Error::NotFound.into();
        assert_eq!(err, ApiError::NotFound("Resource not found!".to_string()));
    }
}
