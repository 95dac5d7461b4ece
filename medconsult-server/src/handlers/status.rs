use axum::{extract::State, response::Json};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{AppState, error::AppError};

/// Health check (GET /health)
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.config.log.service_name,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Document counts per collection (GET /status)
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let counts = state.store.count_by_collection()?;
    let total: i64 = counts.iter().map(|(_, c)| c).sum();
    let collections: Vec<_> = counts
        .into_iter()
        .map(|(collection, count)| json!({ "collection": collection, "count": count }))
        .collect();

    Ok(Json(json!({
        "service": state.config.log.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "total": total,
        "collections": collections,
    })))
}
