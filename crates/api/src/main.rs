use std::sync::Arc;

use marquee_api::config::MarqueeConfig;
use marquee_api::router::build_app_router;
use marquee_api::state::AppState;
use marquee_catalog::TmdbCatalog;
use marquee_library::Session;
use marquee_recommend::{MessagesClient, RecommendationPipeline};
use marquee_store::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=debug,marquee_library=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let MarqueeConfig {
        server: config,
        library,
        catalog: catalog_config,
        generator: generator_config,
    } = match MarqueeConfig::from_env() {
        Ok(config) => {
            for key in config.missing_credentials() {
                tracing::warn!(key, "Credential not set; the matching service will reject requests");
            }
            config
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(listen = %config.listen, "Loaded server configuration");

    // --- Collaborators ---
    let store = Arc::new(MemoryStore::new());
    tracing::info!("Using in-process document store");

    let catalog = Arc::new(TmdbCatalog::new(catalog_config).expect("Failed to build catalog client"));
    let generator =
        Arc::new(MessagesClient::new(generator_config).expect("Failed to build generator client"));
    tracing::info!(model = %generator.model(), "Text generator configured");

    // --- Session + pipeline ---
    let session = Arc::new(Session::new(store, catalog.clone(), library));
    let pipeline = Arc::new(RecommendationPipeline::new(generator, catalog));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        session: Arc::clone(&session),
        pipeline,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    tracing::info!(addr = %config.listen, "Starting server");

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if tokio::time::timeout(config.shutdown_timeout, session.shutdown())
        .await
        .is_err()
    {
        tracing::warn!("Session shutdown timed out");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
