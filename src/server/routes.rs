use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;
use crate::storage::schema;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: String,
    pub missing_tables: Vec<&'static str>,
}

/// Liveness probe. 503 until `init_db` has created every table.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<HealthResponse>), (StatusCode, Json<ErrorResponse>)> {
    let existing = state.db.lock().await.table_names().map_err(|e| {
        tracing::error!("health check failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() }))
    })?;

    let missing_tables: Vec<&'static str> = schema::all_tables()
        .filter(|table| !existing.iter().any(|name| name == table))
        .collect();

    let (code, status) = if missing_tables.is_empty() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "uninitialized")
    };

    Ok((
        code,
        Json(HealthResponse {
            status,
            database: state.database_path.display().to_string(),
            missing_tables,
        }),
    ))
}
