use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::CompletionProvider;
use crate::state::AppState;

/// GET /
/// Welcome message for clients that call the root path.
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Welcome to MaterialMind API" }))
}

/// GET /health
/// Returns service version, whether the model credential is present, and the report directory.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "materialmind-api",
        "llm_configured": state.provider.is_configured(),
        "output_dir": state.config.output_dir.display().to_string()
    }))
}
