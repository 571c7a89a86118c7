//! Axum route handlers for the Jobs API.

use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::models::JobSummary;
use crate::jobs::search::SearchStats;
use crate::matching::scorer::{rank_jobs, summarize, MatchProfile, MatchSummary, RankedJob};
use crate::resume::profile::{build_profile, profile_summary, CandidateProfile};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub location: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub location: Option<String>,
    pub total: usize,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub query: String,
    pub location: Option<String>,
    pub max_results: Option<usize>,
    /// A stored analysis whose profile should be used.
    pub analysis_id: Option<Uuid>,
    /// Raw profile JSON; validated the same way as an extracted one.
    pub profile: Option<Value>,
    /// Optional skill → proficiency (0 – 1) weighting for skill matches.
    #[serde(default)]
    pub skill_proficiency: HashMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub query: String,
    pub profile_summary: String,
    pub summary: MatchSummary,
    pub jobs: Vec<RankedJob>,
}

fn effective_max_results(requested: Option<usize>, limit: usize) -> usize {
    requested.unwrap_or(limit).clamp(1, limit.max(1))
}

async fn resolve_profile(state: &AppState, request: &MatchRequest) -> Result<CandidateProfile, AppError> {
    if let Some(id) = request.analysis_id {
        return state
            .sessions
            .get(&id)
            .await
            .map(|record| record.profile)
            .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found or expired")));
    }
    match &request.profile {
        Some(raw) if raw.is_object() => Ok(build_profile(raw)),
        Some(_) => Err(AppError::Validation("profile must be a JSON object".to_string())),
        None => Err(AppError::Validation(
            "Either analysis_id or profile is required".to_string(),
        )),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let max_results = effective_max_results(request.max_results, state.config.max_jobs_per_search);
    let jobs = state
        .job_search
        .search_all(&request.query, request.location.as_deref(), max_results)
        .await?;

    Ok(Json(SearchResponse {
        query: request.query,
        location: request.location,
        total: jobs.len(),
        jobs: jobs.iter().map(|j| j.summary()).collect(),
    }))
}

/// POST /api/v1/jobs/match
///
/// Searches all providers, then ranks the results against a candidate profile
/// taken from a stored analysis or supplied inline.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let profile = resolve_profile(&state, &request).await?;
    let max_results = effective_max_results(request.max_results, state.config.max_jobs_per_search);

    let jobs = state
        .job_search
        .search_all(&request.query, request.location.as_deref(), max_results)
        .await?;

    let ranked = rank_jobs(
        &jobs,
        &MatchProfile::from_candidate(&profile).with_proficiency(&request.skill_proficiency),
        max_results,
        state.scorer.as_ref(),
    );
    let summary = summarize(&ranked);
    info!(
        "Matched {} jobs for '{}' (top {:.1}%)",
        summary.total_matches, request.query, summary.top_score
    );

    Ok(Json(MatchResponse {
        query: request.query,
        profile_summary: profile_summary(&profile),
        summary,
        jobs: ranked,
    }))
}

/// GET /api/v1/jobs/stats
pub async fn handle_stats(State(state): State<AppState>) -> Json<SearchStats> {
    Json(state.job_search.stats().await)
}
