use std::net::SocketAddr;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moments_backend::{
    auth_middleware, handlers, health_check, host_filter_middleware, initialize_app_state,
    services::spawn_post_digest_job,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moments_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let state = initialize_app_state().await?;
    let bind_address = state.config.server.bind_address.clone();
    info!("Starting Moments backend on {}", bind_address);

    // Periodic unseen-posts digest
    spawn_post_digest_job(
        state.diesel_pool.clone(),
        state.email_service.clone(),
        Duration::from_secs(state.config.jobs.digest_interval_seconds),
        state.config.jobs.digest_post_sample,
    );

    let protected = handlers::protected_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let app = Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::public_payment_routes())
        .merge(protected)
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            host_filter_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
