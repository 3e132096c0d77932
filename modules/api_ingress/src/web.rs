use std::sync::Arc;

use axum::{
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Serves a pre-rendered OpenAPI document; the JSON is built once at finalize.
pub async fn openapi_json(doc: Arc<Value>) -> Response {
    ([(header::CACHE_CONTROL, "no-store")], Json((*doc).clone())).into_response()
}
