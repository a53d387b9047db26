use axum::{Json, response::IntoResponse};

// health handler - never rate limited, no inputs
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}
