use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the `spells` table. Written once per cast, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SpellRecord {
    pub id: Uuid,
    pub intent: String,
    pub length: String,
    pub spell_text: String,
    pub user_agent: Option<String>,
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}
