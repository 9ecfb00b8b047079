//! Agora server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agora_api::{middleware::AppState, router as api_router};
use agora_common::Config;
use agora_core::{PollService, TokenService, UserService, VoteService};
use agora_db::repositories::{PollRepository, PollVoteRepository, UserRepository};
use axum::middleware;
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
                .unwrap_or_else(|_| "agora=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting agora server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = agora_db::init(&config.database).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    agora_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let poll_vote_repo = PollVoteRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo);
    let token_service = TokenService::new(&config.auth);
    let poll_service = PollService::new(poll_repo.clone());
    let vote_service = VoteService::new(poll_repo, poll_vote_repo);

    // Create app state
    let state = AppState {
        user_service,
        token_service,
        poll_service,
        vote_service,
    };

    // Build router
    let app = api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            agora_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state.clone());

    // Start the expired poll sweeper
    if config.sweeper.enabled {
        info!(
            interval = config.sweeper.interval_seconds,
            "Starting expired poll sweeper..."
        );
        let sweeper = state.poll_service.clone();
        let period = Duration::from_secs(config.sweeper.interval_seconds);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match sweeper.close_expired().await {
                    Ok(0) => {}
                    Ok(count) => info!(count, "Closed expired polls"),
                    Err(e) => tracing::error!(error = %e, "Expired poll sweep failed"),
                }
            }
        });
    }

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
