pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::resumes::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        // Stateless: the record travels in the request body
        .route("/api/v1/render", post(handlers::handle_render))
        .route("/api/v1/export", post(handlers::handle_export))
        .route("/api/v1/resumes/validate", post(handlers::handle_validate))
        .route("/api/v1/resumes/migrate", post(handlers::handle_migrate))
        // Stored records
        .route(
            "/api/v1/resumes/:id",
            get(handlers::handle_get_resume).put(handlers::handle_put_resume),
        )
        .route(
            "/api/v1/resumes/:id/render",
            get(handlers::handle_render_stored),
        )
        .route(
            "/api/v1/resumes/:id/export",
            get(handlers::handle_export_stored),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::export::DOCX_CONTENT_TYPE;
    use crate::models::resume::SCHEMA_VERSION_LEGACY;
    use crate::resumes::store::MemoryResumeStore;

    fn state_with(store: Arc<MemoryResumeStore>, default_template: &str) -> AppState {
        AppState {
            store,
            config: Config {
                database_url: String::new(),
                port: 0,
                rust_log: "debug".to_string(),
                default_template: default_template.to_string(),
                export_timeout: Duration::from_secs(20),
            },
        }
    }

    fn app() -> Router {
        build_router(state_with(Arc::new(MemoryResumeStore::default()), "classic"))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn legacy_record() -> Value {
        json!({
            "basics": { "name": "Ada Lovelace", "email": "ada@example.com", "summary": "Analyst" },
            "experience": [{ "role": "Engineer", "organization": "Acme", "bullets": ["Built it"] }],
            "skills": [{ "label": "Languages", "items": ["Rust", "SQL"] }],
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_templates_lists_both() {
        let app = build_router(state_with(Arc::new(MemoryResumeStore::default()), "split"));
        let response = app
            .oneshot(Request::get("/api/v1/templates").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["default"], "split");
        assert_eq!(body["templates"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_render_uses_default_template() {
        let app = build_router(state_with(Arc::new(MemoryResumeStore::default()), "split"));
        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/render",
                json!({ "record": legacy_record() }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["template"], "split");
        assert_eq!(body["tree"]["body"]["layout"], "two_column");
        assert_eq!(body["tree"]["summary"], "Analyst");
    }

    #[tokio::test]
    async fn test_render_rejects_non_object_record() {
        let response = app()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/render",
                json!({ "record": [1, 2, 3] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["code"], "MIGRATION_ERROR");
    }

    #[tokio::test]
    async fn test_export_returns_docx() {
        let response = app()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/export",
                json!({ "record": legacy_record(), "template": "classic" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            DOCX_CONTENT_TYPE
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Ada_Lovelace_Resume.docx\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_validate_reports_unknown_items() {
        let record = json!({
            "basics": {},
            "sections": {
                "skills": {
                    "id": "skills", "label": "Skills", "order": 1,
                    "items": [{ "type": "video", "url": "x" }]
                }
            }
        });
        let response = app()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/resumes/validate",
                json!({ "record": record }),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["violations"][0]["kind"], "unknown_item_variant");
    }

    #[tokio::test]
    async fn test_migrate_to_v1_and_bad_target() {
        let response = app()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/resumes/migrate?target=v1",
                json!({ "record": legacy_record() }),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["experience"][0]["role"], "Engineer");
        assert!(body.get("sections").is_none());

        let response = app()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/resumes/migrate?target=v3",
                json!({ "record": legacy_record() }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_then_get_and_render_stored() {
        let store = Arc::new(MemoryResumeStore::default());
        let app = build_router(state_with(store.clone(), "classic"));
        let id = Uuid::new_v4();

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/v1/resumes/{id}"),
                json!({ "record": legacy_record() }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["sections"]["experience"].is_object());

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/resumes/{id}/render?template=split"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["tree"]["body"]["left"][0]["id"], "experience");
    }

    #[tokio::test]
    async fn test_get_migrates_legacy_row() {
        let store = Arc::new(MemoryResumeStore::default());
        let id = Uuid::new_v4();
        store
            .insert_raw(id, legacy_record(), SCHEMA_VERSION_LEGACY)
            .await;
        let app = build_router(state_with(store.clone(), "classic"));

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/resumes/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sections"]["summary"]["items"][0]["content"], "Analyst");
        assert!(store.row(id).await.unwrap().data.get("sections").is_some());
    }

    #[tokio::test]
    async fn test_missing_resume_is_404() {
        let response = app()
            .oneshot(
                Request::get(format!("/api/v1/resumes/{}/export", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }
}
