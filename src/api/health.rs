use axum::Json;
use serde_json::{Value, json};
use tracing::info;

/// GET /health
pub async fn health_check() -> Json<Value> {
    info!("Health check requested");
    Json(json!({ "status": "healthy" }))
}
