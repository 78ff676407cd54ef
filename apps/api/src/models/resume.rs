use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Stored record shape: 1 = flat legacy arrays, 2 = sections map.
pub const SCHEMA_VERSION_LEGACY: i16 = 1;
pub const SCHEMA_VERSION_SECTIONS: i16 = 2;

/// A row of the `resumes` table. `data` is kept as raw JSON because rows
/// written before the sections format still hold the legacy shape.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub data: Value,
    pub schema_version: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
