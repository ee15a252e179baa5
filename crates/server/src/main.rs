//! Sharegraph server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use sharegraph_api::{AppState, app};
use sharegraph_common::{Config, Metrics};
use sharegraph_core::{FriendService, LogEventPublisher, RecommendService};
use sharegraph_db::{FeatureRepository, GraphRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    Ok(match config.server.allow_origin.as_deref() {
        Some(origin) => layer.allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin {origin:?}"))?,
        ),
        None => layer.allow_origin(Any),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sharegraph=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting sharegraph server...");

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Connect to database
    let db = sharegraph_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    sharegraph_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Services
    let mut friend_service = FriendService::new(Arc::new(GraphRepository::new(Arc::clone(&db))));
    friend_service.set_event_publisher(Arc::new(LogEventPublisher));
    let recommend_service = RecommendService::new(
        Arc::new(FeatureRepository::new(Arc::clone(&db))),
        config.recommend,
    );

    let state = AppState {
        friend_service,
        recommend_service,
        metrics: Arc::new(Metrics::new()),
        auth: config.auth.clone(),
        recommend: config.recommend,
    };

    let app = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?);

    // Start server with graceful shutdown
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server host {:?}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
