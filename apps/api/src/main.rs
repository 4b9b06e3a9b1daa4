//! # Shopcart API
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ApiConfig::load()  (env)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new()  → pool + migrations                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppState::from_database()  → engine + services                        │
//! │       │                                                                 │
//! │       ├── ADMIN_EMAIL set? → ensure_admin                              │
//! │       ▼                                                                 │
//! │  axum::serve(0.0.0.0:HTTP_PORT) until Ctrl+C / SIGTERM                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::close()                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use shopcart_api::auth::{Argon2Hasher, JwtManager};
use shopcart_api::{router, ApiConfig, AppState};
use shopcart_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "shopcart_api=info,shopcart_engine=info,shopcart_db=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting Shopcart API server...");

    let config = ApiConfig::load().context("loading configuration")?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set, using the development secret");
    }

    let db_config = DbConfig::new(&config.database_path).max_connections(config.db_max_connections);
    let db = Database::new(db_config)
        .await
        .context("opening database")?;

    let state = AppState::from_database(
        db.clone(),
        JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs),
        Arc::new(Argon2Hasher::default()),
    );

    if let Some((email, password)) = config.admin_credentials() {
        let created = state
            .accounts
            .ensure_admin(email, password)
            .await
            .context("creating admin account")?;
        if created {
            info!(email = %email, "Admin account created");
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
