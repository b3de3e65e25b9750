//! Axum route handler for newsletter subscriptions.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppJson};
use crate::state::AppState;
use crate::subscription::store::SubscribeOutcome;

pub const SUBSCRIBED_MESSAGE: &str = "You're subscribed! New spells will find their way to you.";
pub const ALREADY_SUBSCRIBED_MESSAGE: &str = "You're already subscribed.";

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub message: &'static str,
}

/// POST /subscribe
pub async fn handle_subscribe(
    State(state): State<AppState>,
    AppJson(request): AppJson<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>, AppError> {
    let email = request.email.unwrap_or_default();

    let message = match state.subscribers.subscribe(&email).await? {
        SubscribeOutcome::Subscribed => SUBSCRIBED_MESSAGE,
        SubscribeOutcome::AlreadySubscribed => ALREADY_SUBSCRIBED_MESSAGE,
    };

    Ok(Json(SubscribeResponse { message }))
}
