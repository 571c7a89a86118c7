pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Headroom on top of the file limit for multipart framing and form fields.
const BODY_HEADROOM_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.file_size_limit_bytes() + BODY_HEADROOM_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/config/status", get(health::config_status_handler))
        // Resume API
        .route("/api/v1/resume/analyze", post(resume::handle_analyze))
        .route("/api/v1/resume/analyses/:id", get(resume::handle_get_analysis))
        // Jobs API
        .route("/api/v1/jobs/search", post(jobs::handle_search))
        .route("/api/v1/jobs/match", post(jobs::handle_match))
        .route("/api/v1/jobs/stats", get(jobs::handle_stats))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
