//! Backtalk server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use backtalk_api::{middleware::AppState, router as api_router};
use backtalk_common::Config;
use backtalk_core::{CommentService, ModerationService, NotificationService, SessionService};
use backtalk_db::repositories::{CommentRepository, ProfileRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backtalk=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting backtalk server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = backtalk_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    backtalk_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));

    // Initialize services
    let comment_service = CommentService::new(comment_repo.clone(), profile_repo.clone());
    let moderation_service = ModerationService::new(profile_repo.clone());
    let notification_service = NotificationService::new(comment_repo);
    let session_service = SessionService::new(profile_repo, &config);

    // Create app state
    let state = AppState {
        comment_service,
        moderation_service,
        notification_service,
        session_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            backtalk_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
