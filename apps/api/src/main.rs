mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod spell;
mod state;
mod subscription;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::spell::persistence::{DisabledSpellSink, PgSpellSink, SpellSink};
use crate::state::AppState;
use crate::subscription::store::SubscriberStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (only a malformed PORT is fatal)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Spellcaster API v{}", env!("CARGO_PKG_VERSION"));
    config.warn_missing();

    let spell_sink = build_spell_sink(&config).await;

    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    );
    info!("LLM client initialized (model: {})", llm.model());

    let subscribers = Arc::new(SubscriberStore::new(&config.subscribers_file));
    match subscribers.list().await {
        Ok(list) => info!(
            "Subscriber store at {} ({} subscribers)",
            subscribers.path().display(),
            list.len()
        ),
        Err(e) => warn!(
            "Subscriber store at {} is unreadable: {e}",
            subscribers.path().display()
        ),
    }

    let state = AppState {
        llm: Arc::new(llm),
        spell_sink,
        subscribers,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Connects the Postgres sink. Spell recording is best-effort, so an absent or
/// unreachable database degrades to `DisabledSpellSink` instead of aborting.
async fn build_spell_sink(config: &Config) -> Arc<dyn SpellSink> {
    let Some(database_url) = config.database_url.as_deref() else {
        return Arc::new(DisabledSpellSink);
    };

    let pool = match create_pool(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            warn!("PostgreSQL unavailable, spells will not be recorded: {e:#}");
            return Arc::new(DisabledSpellSink);
        }
    };

    if let Err(e) = ensure_schema(&pool).await {
        warn!("Could not ensure the spells table exists: {e:#}");
    }

    Arc::new(PgSpellSink::new(pool))
}
