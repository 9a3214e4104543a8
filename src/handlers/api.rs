use axum::response::Json;
use serde_json::{Value, json};

/// Handler for GET /
///
/// Liveness check; answers without touching any backend.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
