use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub has_api_key: bool,
    pub model: String,
}

/// GET /health
/// Reports liveness, whether a completion key is configured, and the model in use.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        has_api_key: state.config.has_api_key(),
        model: state.config.openai_model.clone(),
    })
}
