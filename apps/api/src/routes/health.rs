use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobmatch-api"
    }))
}

/// GET /api/v1/config/status
/// Which providers are configured, plus the effective limits. Never echoes keys.
pub async fn config_status_handler(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "providers": config.provider_status(),
        "model": llm_client::MODEL,
        "scorer": state.scorer.backend(),
        "stored_analyses": state.sessions.len().await,
        "limits": {
            "max_file_size_mb": config.max_file_size_mb,
            "max_jobs_per_search": config.max_jobs_per_search,
            "cache_ttl_secs": config.cache_ttl,
            "api_timeout_secs": config.api_timeout_secs,
            "retry_attempts": config.retry_attempts
        }
    }))
}
