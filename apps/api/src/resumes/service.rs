//! Record workflows shared by the HTTP handlers: migrate-on-read loading,
//! normalizing writes, and export off the async executor.

use std::time::Duration;

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{serialize_to_document, ExportedDocument};
use crate::models::resume::SCHEMA_VERSION_SECTIONS;
use crate::resumes::store::ResumeStore;
use crate::schema::{ensure_v2_format, normalize, RawRecord, ResumeRecord};

/// Loads a stored record in canonical shape. Rows still in the legacy shape are
/// migrated and written back so the next read is a plain fetch.
pub async fn load_resume(store: &dyn ResumeStore, id: Uuid) -> Result<ResumeRecord, AppError> {
    let row = store
        .fetch(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    let raw = RawRecord::from_value(row.data)?;
    let needs_write_back = raw.is_legacy() || row.schema_version < SCHEMA_VERSION_SECTIONS;
    let record = ensure_v2_format(raw);

    if needs_write_back {
        store.save(id, &record).await?;
        info!(
            resume_id = %id,
            from_version = row.schema_version,
            sections = record.sections.len(),
            "Migrated stored resume to sections format"
        );
    }

    Ok(record)
}

/// Normalizes `data` (either shape) and stores the canonical record.
pub async fn store_resume(
    store: &dyn ResumeStore,
    id: Uuid,
    data: Value,
) -> Result<ResumeRecord, AppError> {
    let record = normalize(data)?;
    store.save(id, &record).await?;
    info!(resume_id = %id, sections = record.sections.len(), "Stored resume");
    Ok(record)
}

/// Builds the export document on the blocking pool. If it does not finish
/// within `limit` the request fails; the task's result is dropped when it ends.
pub async fn export_resume(
    record: ResumeRecord,
    template: String,
    limit: Duration,
) -> Result<ExportedDocument, AppError> {
    let task = tokio::task::spawn_blocking(move || serialize_to_document(&record, &template));

    let joined = tokio::time::timeout(limit, task).await.map_err(|_| {
        AppError::Timeout(format!(
            "Document export did not finish within {}s",
            limit.as_secs()
        ))
    })?;

    let document = joined
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))??;
    Ok(document)
}
