use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::ExportedDocument;
use crate::projection::{Template, TemplateInfo};
use crate::render::{render, RenderTree};
use crate::resumes::service::{export_resume, load_resume, store_resume};
use crate::schema::{
    migrate_v2_to_v1, normalize, validate, ResumeRecord, ValidationResult, Violation,
};
use crate::state::AppState;

/// Body shared by the stateless endpoints. `record` may be in either shape.
#[derive(Deserialize)]
pub struct RecordRequest {
    pub record: Value,
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Deserialize)]
pub struct TemplateQuery {
    pub template: Option<String>,
}

#[derive(Deserialize)]
pub struct MigrateQuery {
    pub target: Option<String>,
}

#[derive(Serialize)]
pub struct RenderResponse {
    pub template: &'static str,
    pub tree: RenderTree,
    /// Problems found in the record; rendering skipped the affected parts.
    pub violations: Vec<Violation>,
}

#[derive(Serialize)]
pub struct TemplatesResponse {
    pub default: String,
    pub templates: Vec<TemplateInfo>,
}

fn template_or_default(state: &AppState, requested: Option<String>) -> String {
    requested.unwrap_or_else(|| state.config.default_template.clone())
}

fn render_response(record: &ResumeRecord, template_id: &str) -> RenderResponse {
    let tree = render(record, template_id);
    let violations = validate(record).violations;
    info!(
        template = tree.template.id(),
        violations = violations.len(),
        "Rendered resume"
    );
    RenderResponse {
        template: tree.template.id(),
        tree,
        violations,
    }
}

fn document_response(document: ExportedDocument) -> Response {
    (
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        document.bytes,
    )
        .into_response()
}

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<TemplatesResponse> {
    Json(TemplatesResponse {
        default: Template::from_id(&state.config.default_template).id().to_string(),
        templates: Template::all().iter().map(Template::info).collect(),
    })
}

/// POST /api/v1/render
pub async fn handle_render(
    State(state): State<AppState>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<RenderResponse>, AppError> {
    let record = normalize(req.record)?;
    let template = template_or_default(&state, req.template);
    Ok(Json(render_response(&record, &template)))
}

/// POST /api/v1/export
pub async fn handle_export(
    State(state): State<AppState>,
    Json(req): Json<RecordRequest>,
) -> Result<Response, AppError> {
    let record = normalize(req.record)?;
    let template = template_or_default(&state, req.template);
    let document = export_resume(record, template, state.config.export_timeout).await?;
    Ok(document_response(document))
}

/// POST /api/v1/resumes/validate
pub async fn handle_validate(
    Json(req): Json<RecordRequest>,
) -> Result<Json<ValidationResult>, AppError> {
    let record = normalize(req.record)?;
    Ok(Json(validate(&record)))
}

/// POST /api/v1/resumes/migrate?target=v1|v2
pub async fn handle_migrate(
    Query(query): Query<MigrateQuery>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<Value>, AppError> {
    let record = normalize(req.record)?;
    let migrated = match query.target.as_deref().unwrap_or("v2") {
        "v2" => serde_json::to_value(&record),
        "v1" => serde_json::to_value(migrate_v2_to_v1(&record)),
        other => {
            return Err(AppError::Validation(format!(
                "Unknown migration target '{other}', expected 'v1' or 'v2'"
            )))
        }
    }
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode migrated record: {e}")))?;
    Ok(Json(migrated))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_put_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = store_resume(state.store.as_ref(), id, req.record).await?;
    Ok(Json(record))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = load_resume(state.store.as_ref(), id).await?;
    Ok(Json(record))
}

/// GET /api/v1/resumes/:id/render?template=
pub async fn handle_render_stored(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<RenderResponse>, AppError> {
    let record = load_resume(state.store.as_ref(), id).await?;
    let template = template_or_default(&state, query.template);
    Ok(Json(render_response(&record, &template)))
}

/// GET /api/v1/resumes/:id/export?template=
pub async fn handle_export_stored(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TemplateQuery>,
) -> Result<Response, AppError> {
    let record = load_resume(state.store.as_ref(), id).await?;
    let template = template_or_default(&state, query.template);
    let document = export_resume(record, template, state.config.export_timeout).await?;
    Ok(document_response(document))
}
