use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::storage::Database;

pub mod routes;

/// Server state
pub struct AppState {
    pub database_path: PathBuf,
    pub db: Mutex<Database>,
}

impl AppState {
    pub fn new(database_path: PathBuf, db: Database) -> Arc<Self> {
        Arc::new(Self {
            database_path,
            db: Mutex::new(db),
        })
    }
}

/// Router with cross-origin requests allowed from any browser client
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = build_router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
