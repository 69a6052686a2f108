use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anitrack_core::{
    create_authenticator, load_config, validate_config, AnimeCatalog, Authenticator,
    CachedCatalog, LibraryStore, MalClient, SqliteLibraryStore, UnconfiguredCatalog,
};
use anitrack_server::api::create_router;
use anitrack_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("ANITRACK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {}", config.auth.method.as_str());
    info!("Database path: {:?}", config.database.path);
    info!(
        "Response cache TTL: {}s (max entries: {:?})",
        config.cache.ttl_secs, config.cache.max_entries
    );

    // Create library store (users, watchlists, reviews)
    let library: Arc<dyn LibraryStore> = Arc::new(
        SqliteLibraryStore::new(&config.database.path)
            .context("Failed to create library store")?,
    );
    info!("Library store initialized");

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> =
        Arc::from(create_authenticator(&config.auth, Arc::clone(&library)));
    info!("Using authenticator: {}", authenticator.method_name());

    // Create catalog client
    let remote: Arc<dyn AnimeCatalog> = match &config.catalog {
        Some(catalog_config) => {
            info!("Initializing MyAnimeList client");
            Arc::new(MalClient::new(catalog_config).context("Failed to create catalog client")?)
        }
        None => {
            warn!("No catalog configured, browse endpoints will report missing data");
            Arc::new(UnconfiguredCatalog)
        }
    };
    let catalog = Arc::new(CachedCatalog::new(remote, &config.cache));

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        library,
        catalog,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
