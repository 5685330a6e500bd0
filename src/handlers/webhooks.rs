use axum::{body::Bytes, response::IntoResponse, Json};
use serde_json::json;

/// POST /app-webhooks - accept any payload, record its size
pub async fn receive(body: Bytes) -> impl IntoResponse {
    tracing::info!("Webhook received ({} bytes)", body.len());
    Json(json!({ "message": "Webhook received" }))
}

/// GET /app-webhooks - the provider probes the URL before registering it
pub async fn verify() -> impl IntoResponse {
    Json(json!({ "message": "Webhook endpoint ready" }))
}
