//! # Ridge POS Server
//!
//! HTTP JSON API for the point-of-sale backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          pos-server                                 │
//! │                                                                     │
//! │  Terminal ───► HTTP :3000 ───► axum routes ───► pos-db gateway      │
//! │                                     │                │              │
//! │                                     ▼                ▼              │
//! │                               pos-core pricing   SQLite file        │
//! │                                                  or remote store    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backend selection happens once at startup from the environment; the
//! chosen transaction capability is logged so operators know which
//! atomicity contract they are running under.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pos_core::Role;
use pos_db::repository::UserRepository;
use pos_db::{
    schema, Gateway, LocalConfig, LocalGateway, RemoteConfig, RemoteGateway, TransactionSupport,
};

use crate::auth::{hash_password, JwtManager};
use crate::config::{BackendConfig, ServerConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Ridge POS server...");

    // Load configuration
    let config = ServerConfig::load()?;

    // Select and connect the datastore backend
    let gateway: Arc<dyn Gateway> = match &config.backend {
        BackendConfig::Local { database_path } => {
            Arc::new(LocalGateway::connect(LocalConfig::new(database_path)).await?)
        }
        BackendConfig::Remote { url, auth_token } => {
            Arc::new(RemoteGateway::new(RemoteConfig::new(url, auth_token))?)
        }
    };

    match gateway.transaction_support() {
        TransactionSupport::Full => {
            info!("Datastore backend: full multi-statement transactions")
        }
        TransactionSupport::PerStatement => warn!(
            "Datastore backend: per-statement atomicity only; a failed \
             checkout may leave partially-applied statements"
        ),
    }

    // Apply schema and seeds
    schema::initialize(gateway.as_ref()).await?;

    // Seed the first admin account
    seed_admin(gateway.clone(), &config).await?;

    // Build router
    let state = AppState::new(
        gateway,
        JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs),
    );
    let app = routes::router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Creates the initial admin user on an empty database.
///
/// The password comes from `SEED_ADMIN_PASSWORD`; with no password set
/// and no users present, the server starts but nobody can log in, which
/// is preferable to shipping a default credential.
async fn seed_admin(
    gateway: Arc<dyn Gateway>,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = UserRepository::new(gateway);
    if users.count().await? > 0 {
        return Ok(());
    }

    match &config.seed_admin_password {
        Some(password) => {
            let hash = hash_password(password).map_err(|e| e.to_string())?;
            let admin = users
                .create(&config.seed_admin_username, &hash, Role::Admin, "Administrator")
                .await?;
            info!(username = %admin.username, "Seeded initial admin account");
        }
        None => {
            warn!(
                "No users exist and SEED_ADMIN_PASSWORD is not set; \
                 logins will fail until an account is created"
            );
        }
    }
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
