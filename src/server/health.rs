use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

/// Routes for liveness probing, mounted on the main listener.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
