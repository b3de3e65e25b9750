//! Axum route handler for casting spells.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header::USER_AGENT, HeaderMap},
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, AppJson};
use crate::spell::caster::{cast_spell, prepare, CastSpellRequest};
use crate::spell::persistence::{client_ip, new_record, spawn_record};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CastSpellResponse {
    pub spell: String,
}

/// POST /cast-spell
///
/// Validates the intention and ingredients, generates the spell, and hands a
/// record to the persistence sink without waiting on it.
pub async fn handle_cast_spell(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    AppJson(request): AppJson<CastSpellRequest>,
) -> Result<Json<CastSpellResponse>, AppError> {
    let prepared = prepare(&request)?;
    let result = cast_spell(state.llm.as_ref(), &prepared).await?;

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr.ip()));

    spawn_record(
        state.spell_sink.clone(),
        new_record(&prepared.intent, prepared.length, &result.text, user_agent, &ip),
    );

    Ok(Json(CastSpellResponse { spell: result.text }))
}
