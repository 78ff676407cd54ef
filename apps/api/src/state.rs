use std::sync::Arc;

use crate::config::Config;
use crate::resumes::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resume persistence. `PgResumeStore` in production.
    pub store: Arc<dyn ResumeStore>,
    pub config: Config,
}
