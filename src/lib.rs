// Library exports for the Moments backend.

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use db::{DieselPool, RedisPool};
pub use middleware::{auth_middleware, host_filter_middleware, AuthenticatedUser};
pub use models::auth::{AccessTokenClaims, RefreshTokenClaims, ResetTokenClaims};
pub use services::{
    AccountService, EmailService, EngagementService, FollowService, GithubOauthService,
    JwtConfig, JwtError, JwtService, ModerationService, PaymentService, PostService,
    ProfileService, RateLimitConfig, RateLimitService, StorageService, StripeClient, TokenPair,
};
pub use utils::{ApiError, ApiResponse};

use std::sync::Arc;
use std::time::Duration;

/// Build the full application state from configuration: pools, migrations,
/// and every service, explicitly constructed and wired together.
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error>> {
    use tracing::info;

    // Load environment
    dotenv::dotenv().ok();

    let config = Arc::new(app_config::config().clone());

    // Initialize database pool
    info!("Initializing database pool...");
    let db_config = db::DieselDatabaseConfig::from(&config.database);
    let diesel_pool = db::create_diesel_pool(db_config).await?;

    // Run migrations if enabled
    if migrations::should_run_migrations() {
        info!("Running embedded migrations...");
        migrations::run_migrations(config.database.url.clone())
            .await
            .map_err(|e| format!("Migration failed: {}", e))?;
    }

    // Initialize Redis (rate limiter backend)
    info!("Initializing Redis connection...");
    let redis_pool = RedisPool::new(&config.redis).await?;

    // Infrastructure services
    let jwt_service = Arc::new(JwtService::new(JwtConfig::from_settings(&config.jwt)));
    let rate_limit_service = Arc::new(RateLimitService::new(redis_pool.clone()));
    let email_service = Arc::new(EmailService::new(config.email.clone())?);
    let storage_service = Arc::new(StorageService::new(config.storage.clone())?);
    let oauth_service = Arc::new(GithubOauthService::new(config.oauth.clone())?);
    let stripe_client = Arc::new(StripeClient::new(config.payment.clone())?);

    // Domain services
    let account_service = Arc::new(AccountService::new(
        diesel_pool.clone(),
        jwt_service.clone(),
        email_service.clone(),
        Duration::from_secs(config.otp.ttl_seconds),
    ));
    let profile_service = Arc::new(ProfileService::new(
        diesel_pool.clone(),
        storage_service.clone(),
    ));
    let follow_service = Arc::new(FollowService::new(diesel_pool.clone()));
    let post_service = Arc::new(PostService::new(
        diesel_pool.clone(),
        storage_service.clone(),
        email_service.clone(),
        follow_service.clone(),
    ));
    let engagement_service = Arc::new(EngagementService::new(
        diesel_pool.clone(),
        follow_service.clone(),
    ));
    let moderation_service = Arc::new(ModerationService::new(diesel_pool.clone()));
    let payment_service = Arc::new(PaymentService::new(
        diesel_pool.clone(),
        stripe_client.clone(),
    ));

    Ok(AppState {
        config,
        diesel_pool,
        redis_pool,
        jwt_service,
        rate_limit_service,
        account_service,
        profile_service,
        follow_service,
        post_service,
        engagement_service,
        moderation_service,
        payment_service,
        oauth_service,
        email_service,
        storage_service,
    })
}

/// Health check handler reporting component status
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    use axum::http::StatusCode;
    use axum::Json;

    let mut overall_healthy = true;
    let timestamp = chrono::Utc::now().to_rfc3339();

    // Check PostgreSQL
    let postgres_health = match db::check_diesel_health(&state.diesel_pool).await {
        Ok(_) => serde_json::json!({
            "status": "healthy",
            "error": null
        }),
        Err(e) => {
            overall_healthy = false;
            serde_json::json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            })
        }
    };

    // Check Redis
    let redis_health = state.redis_pool.health_check().await;
    if !redis_health.is_healthy {
        overall_healthy = false;
    }

    let response = serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "service": "moments-backend",
        "timestamp": timestamp,
        "components": {
            "postgresql": postgres_health,
            "redis": serde_json::json!({
                "status": if redis_health.is_healthy { "healthy" } else { "unhealthy" },
                "latency_ms": redis_health.latency_ms,
                "error": redis_health.error
            })
        }
    });

    if overall_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
