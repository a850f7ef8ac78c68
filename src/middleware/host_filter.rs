// Trusted-host middleware: rejects requests whose Host header is not in the
// allow-list, with a www-to-bare-host redirect carve-out.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;

/// Decision for an inbound Host header value
#[derive(Debug, PartialEq, Eq)]
pub enum HostDecision {
    Allowed,
    RedirectTo(String),
    Rejected,
}

/// Classify a Host header against the allow-list. A wildcard entry admits
/// everything; `www.<allowed>` is redirected to the bare host.
pub fn check_host(host: Option<&str>, allowed_hosts: &[String]) -> HostDecision {
    if allowed_hosts.iter().any(|h| h == "*") {
        return HostDecision::Allowed;
    }

    let host = match host {
        Some(host) => host.split(':').next().unwrap_or(host),
        None => return HostDecision::Rejected,
    };

    if allowed_hosts.iter().any(|h| h == host) {
        return HostDecision::Allowed;
    }

    if let Some(bare) = host.strip_prefix("www.") {
        if allowed_hosts.iter().any(|h| h == bare) {
            return HostDecision::RedirectTo(bare.to_string());
        }
    }

    HostDecision::Rejected
}

pub async fn host_filter_middleware(
    State(app_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok());

    match check_host(host, &app_state.config.security.allowed_hosts) {
        HostDecision::Allowed => next.run(request).await,
        HostDecision::RedirectTo(bare_host) => {
            let scheme = if app_state.config.is_production() {
                "https"
            } else {
                "http"
            };
            let location = format!(
                "{}://{}{}",
                scheme,
                bare_host,
                request
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/")
            );

            let mut response = StatusCode::MOVED_PERMANENTLY.into_response();
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
            response
        },
        HostDecision::Rejected => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "Invalid host header",
                "success": false,
                "data": {},
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_allowed_host() {
        let allowed = hosts(&["moments.app", "localhost"]);
        assert_eq!(check_host(Some("moments.app"), &allowed), HostDecision::Allowed);
        assert_eq!(
            check_host(Some("localhost:8080"), &allowed),
            HostDecision::Allowed
        );
    }

    #[test]
    fn test_www_redirect_carve_out() {
        let allowed = hosts(&["moments.app"]);
        assert_eq!(
            check_host(Some("www.moments.app"), &allowed),
            HostDecision::RedirectTo("moments.app".to_string())
        );
    }

    #[test]
    fn test_unknown_host_rejected() {
        let allowed = hosts(&["moments.app"]);
        assert_eq!(check_host(Some("evil.example"), &allowed), HostDecision::Rejected);
        assert_eq!(check_host(None, &allowed), HostDecision::Rejected);
        assert_eq!(
            check_host(Some("www.evil.example"), &allowed),
            HostDecision::Rejected
        );
    }

    #[test]
    fn test_wildcard_admits_everything() {
        let allowed = hosts(&["*"]);
        assert_eq!(check_host(Some("anything.example"), &allowed), HostDecision::Allowed);
        assert_eq!(check_host(None, &allowed), HostDecision::Allowed);
    }
}
