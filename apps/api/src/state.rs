use std::sync::Arc;

use crate::config::Config;
use crate::jobs::search::JobSearchService;
use crate::llm_client::LlmClient;
use crate::matching::scorer::JobScorer;
use crate::resume::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: LlmClient,
    pub job_search: Arc<JobSearchService>,
    /// Pluggable job scorer. Default: WeightedJobScorer.
    pub scorer: Arc<dyn JobScorer>,
    /// Completed analyses, reusable by `/jobs/match` until they expire.
    pub sessions: Arc<SessionStore>,
}
