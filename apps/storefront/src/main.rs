//! # Dentica Storefront Server
//!
//! ```text
//! load AppConfig ──► open SQLite (+ migrations) ──► AppState ──► axum::serve
//!                                                                   │
//!                                       Ctrl+C / SIGTERM ──► graceful shutdown
//! ```

use std::path::Path;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use dentica_db::{Database, DbConfig};
use dentica_storefront::{app, init_tracing, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Dentica storefront...");

    let config = AppConfig::load().context("loading configuration")?;
    info!(
        addr = %config.bind_address(),
        db = %config.database.path,
        "Configuration loaded"
    );

    if let Some(parent) = Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let db_config = DbConfig::new(&config.database.path)
        .max_connections(config.database.max_connections)
        .run_migrations(config.database.run_migrations);
    let db = Database::new(db_config).await.context("opening database")?;
    info!("Database ready");

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("binding {}", config.bind_address()))?;
    info!(addr = %config.bind_address(), "Listening");

    let state = AppState::new(db.clone(), config);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
