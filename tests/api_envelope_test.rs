// Error-to-envelope rendering: every ApiError variant maps to its HTTP
// status and the uniform `{message, success, data}` body.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use moments_backend::utils::{conflict_message, ApiError};

async fn envelope(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

#[tokio::test]
async fn test_every_variant_maps_to_its_status() {
    let cases = vec![
        (ApiError::unauthorized("no"), StatusCode::UNAUTHORIZED),
        (ApiError::forbidden("no"), StatusCode::FORBIDDEN),
        (ApiError::not_found("no"), StatusCode::NOT_FOUND),
        (ApiError::bad_request("no"), StatusCode::BAD_REQUEST),
        (ApiError::validation("no"), StatusCode::UNPROCESSABLE_ENTITY),
        (ApiError::conflict("no"), StatusCode::CONFLICT),
        (ApiError::internal("no"), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected) in cases {
        let (status, _) = envelope(error).await;
        assert_eq!(status, expected);
    }
}

#[tokio::test]
async fn test_envelope_shape() {
    let (status, json) = envelope(ApiError::not_found("Post not found!")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Post not found!");
    assert_eq!(json["success"], false);
    assert_eq!(json["data"], serde_json::json!({}));
}

#[tokio::test]
async fn test_unique_violation_conflict_wording() {
    // Driver detail text is the source of the friendly message
    let message = conflict_message(
        Some("users_username_key"),
        Some("Key (username)=(ferris) already exists."),
    );
    let (status, json) = envelope(ApiError::conflict(message)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "username ferris already exists!");
}

#[tokio::test]
async fn test_domain_constraints_have_their_own_wording() {
    for (constraint, expected) in [
        ("follows_edge_key", "Follow request already exists!"),
        ("likes_like_key", "Post already liked!"),
        ("reported_posts_report_key", "Post already reported!"),
    ] {
        let message = conflict_message(Some(constraint), None);
        assert_eq!(message, expected);
    }
}
