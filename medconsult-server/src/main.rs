//! medconsult server entry point

use medconsult_store::DocumentStore;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use medconsult_server::{AppState, build_router, config::ServerConfig, services::AuthService};

#[tokio::main]
async fn main() {
    // Load configuration
    let config_result = ServerConfig::load(
        std::path::Path::new("config.yaml")
            .exists()
            .then_some("config.yaml"),
    );
    let config = config_result.as_ref().cloned().unwrap_or_default();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    let registry = tracing_subscriber::registry().with(filter);
    if config.log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Err(e) = &config_result {
        tracing::warn!("Failed to load config, using defaults: {}", e);
    }
    tracing::info!(service = %config.log.service_name, "Starting medconsult server...");

    // Create data directory
    if let Err(e) = std::fs::create_dir_all(&config.storage.data_dir) {
        tracing::error!("Failed to create data directory: {}", e);
        std::process::exit(1);
    }

    let store = DocumentStore::open(config.database_path()).unwrap_or_else(|e| {
        tracing::error!("Failed to open document store: {}", e);
        std::process::exit(1);
    });

    let state = AppState::new(store, config.clone()).unwrap_or_else(|e| {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    });
    let state = Arc::new(state);

    if let Some(root) = &config.auth.bootstrap_root {
        match AuthService::new(&state).ensure_root(root).await {
            Ok(true) => tracing::info!(email = %root.email, "Root account bootstrapped"),
            Ok(false) => tracing::debug!(email = %root.email, "Root account already present"),
            Err(e) => {
                tracing::error!("Failed to bootstrap root account: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing::info!(
        "Registration: {}",
        if config.auth.open_registration {
            "open"
        } else {
            "root only"
        }
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(state);

    // Bind TCP listener
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Server error: {}", e);
        });

    tracing::info!("Server shut down gracefully");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
