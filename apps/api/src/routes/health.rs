use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Liveness probe for the hosting platform.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": "API Info Center",
        "version": "1.0"
    }))
}
