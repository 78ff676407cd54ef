use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeRow, SCHEMA_VERSION_SECTIONS};
use crate::schema::ResumeRecord;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Persistence port for resume records. Carried in `AppState` as
/// `Arc<dyn ResumeStore>`.
///
/// `save` always writes the canonical sections shape; rows in the legacy shape
/// only ever come from data written before the sections format existed.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError>;

    async fn save(&self, id: Uuid, record: &ResumeRecord) -> Result<ResumeRow, AppError>;
}

fn record_json(record: &ResumeRecord) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(record)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode resume record: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// PgResumeStore
// ────────────────────────────────────────────────────────────────────────────

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            "SELECT id, data, schema_version, created_at, updated_at FROM resumes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save(&self, id: Uuid, record: &ResumeRecord) -> Result<ResumeRow, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, data, schema_version)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
               SET data = EXCLUDED.data,
                   schema_version = EXCLUDED.schema_version,
                   updated_at = now()
            RETURNING id, data, schema_version, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(record_json(record)?)
        .bind(SCHEMA_VERSION_SECTIONS)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryResumeStore
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub use memory::MemoryResumeStore;
