use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::spell::persistence::SpellSink;
use crate::subscription::store::SubscriberStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `LlmClient` in production, a mock in tests.
    pub llm: Arc<dyn CompletionProvider>,
    /// Postgres sink, or `DisabledSpellSink` when `DATABASE_URL` is unset.
    pub spell_sink: Arc<dyn SpellSink>,
    pub subscribers: Arc<SubscriberStore>,
    pub config: Config,
}
