// HTTP handlers and route builders.

pub mod auth;
pub mod engagement;
pub mod follows;
pub mod moderation;
pub mod payments;
pub mod posts;
pub mod users;

use crate::app::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Unauthenticated routes: registration, login, password reset, OAuth
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(auth::register))
        .route("/login/", post(auth::login))
        .route("/refresh/", post(auth::refresh_token))
        .route("/forgot-password/", post(auth::forgot_password))
        .route("/verify-otp/", post(auth::verify_otp))
        .route("/reset-password/", post(auth::reset_password))
        .route("/git-authenticate/", get(auth::git_authenticate))
        .route("/git-callback/", get(auth::git_callback))
}

/// Unauthenticated payment routes: the signature-verified webhook and the
/// static checkout landings
pub fn public_payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/payment/webhook/checkout/success/",
            post(payments::checkout_webhook),
        )
        .route("/payment/success/", get(payments::success))
        .route("/payment/cancel/", get(payments::cancel))
}

/// Bearer-authenticated routes
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        // Profiles and accounts
        .route("/users/", get(users::list_users))
        .route("/user/{username}/", get(users::get_user))
        .route(
            "/user/",
            get(users::get_own_profile)
                .put(users::update_profile)
                .delete(users::delete_profile),
        )
        .route(
            "/base-user/",
            get(users::get_base_user).delete(users::delete_account),
        )
        .route("/admin/", get(users::get_admin).delete(users::delete_admin))
        // Follow graph
        .route("/follow/send/", post(follows::send_request))
        .route("/follow/accept/", post(follows::accept_request))
        .route("/follow/reject/", post(follows::reject_request))
        .route("/follow/cancel/", post(follows::cancel_request))
        .route("/follow/unfollow/", post(follows::unfollow))
        .route("/follow/remove_follower/", post(follows::remove_follower))
        .route("/follow-requests/received/", get(follows::requests_received))
        .route("/follow-requests/sent/", get(follows::requests_sent))
        .route("/followers/{username}/", get(follows::followers))
        .route("/following/{username}/", get(follows::following))
        // Posts
        .route("/post/", post(posts::create_post))
        .route("/post/ad/", post(posts::create_ad_post))
        .route(
            "/post/{id}/",
            put(posts::update_post).delete(posts::delete_post),
        )
        .route("/posts/feed/", get(posts::feed))
        .route("/posts/{username}/", get(posts::list_posts))
        // Likes and comments
        .route(
            "/like/{post_id}/",
            get(engagement::like_post).delete(engagement::unlike_post),
        )
        .route("/comment/", post(engagement::create_comment))
        .route("/comment/{id}/", delete(engagement::delete_comment))
        // Reports and moderation
        .route("/report-post/{post_id}/", post(moderation::report_post))
        .route(
            "/admin/reported_posts/",
            get(moderation::list_reported_posts),
        )
        .route(
            "/admin/reported_posts/{post_id}/",
            delete(moderation::delete_reported_post),
        )
        // Payments
        .route("/payment/subscribe/", get(payments::subscribe))
}
