//! Persistence sink: best-effort, at-most-once recording of cast spells.
//!
//! `spawn_record` detaches the write from the request path. Failures are
//! logged and dropped; nothing here is retried or surfaced to the caller.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use uuid::Uuid;

use crate::models::spell::SpellRecord;
use crate::spell::presets::SpellLength;

/// Hex characters kept from the SHA-256 digest of the client address.
const IP_HASH_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Destination for cast-spell records.
#[async_trait]
pub trait SpellSink: Send + Sync {
    async fn record(&self, record: SpellRecord) -> Result<(), PersistenceError>;
}

/// Writes records to the Postgres `spells` table.
pub struct PgSpellSink {
    pool: PgPool,
}

impl PgSpellSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpellSink for PgSpellSink {
    async fn record(&self, record: SpellRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO spells (id, intent, length, spell_text, user_agent, ip_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.intent)
        .bind(&record.length)
        .bind(&record.spell_text)
        .bind(&record.user_agent)
        .bind(&record.ip_hash)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Used when no database is configured. Accepts and discards every record.
pub struct DisabledSpellSink;

#[async_trait]
impl SpellSink for DisabledSpellSink {
    async fn record(&self, record: SpellRecord) -> Result<(), PersistenceError> {
        debug!("Persistence disabled; dropping spell record {}", record.id);
        Ok(())
    }
}

/// Builds the record for a completed cast. The client address is hashed here
/// and the raw value is not kept.
pub fn new_record(
    intent: &str,
    length: SpellLength,
    spell_text: &str,
    user_agent: Option<String>,
    client_ip: &str,
) -> SpellRecord {
    SpellRecord {
        id: Uuid::new_v4(),
        intent: intent.to_string(),
        length: length.as_str().to_string(),
        spell_text: spell_text.to_string(),
        user_agent,
        ip_hash: hash_ip(client_ip),
        created_at: Utc::now(),
    }
}

/// Fires the write on a detached task. The handler drops the handle and never
/// awaits the result; a failed write only produces a log line.
pub fn spawn_record(sink: Arc<dyn SpellSink>, record: SpellRecord) -> JoinHandle<()> {
    tokio::spawn(async move {
        let id = record.id;
        if let Err(e) = sink.record(record).await {
            error!("Failed to record spell {id}: {e}");
        }
    })
}

/// One-way, truncated digest of a client address.
pub fn hash_ip(ip: &str) -> String {
    let digest = Sha256::digest(ip.as_bytes());
    let mut hashed = hex::encode(digest);
    hashed.truncate(IP_HASH_LEN);
    hashed
}

/// First `X-Forwarded-For` hop, then the socket peer, then `"unknown"`.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|ip| ip.to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
