mod config;
mod errors;
mod jobs;
mod llm_client;
mod matching;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::jobs::search::JobSearchService;
use crate::llm_client::LlmClient;
use crate::matching::scorer::WeightedJobScorer;
use crate::resume::session::SessionStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing GOOGLE_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.log_level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMatch API v{}", env!("CARGO_PKG_VERSION"));

    let timeout = Duration::from_secs(config.api_timeout_secs);
    let llm = LlmClient::new(config.google_api_key.clone(), timeout, config.retry_attempts)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let job_search = JobSearchService::from_config(&config)?;
    let providers = config.provider_status();
    info!(
        "Job providers: adzuna={} remotive={} jsearch={}",
        providers.adzuna, providers.remotive, providers.jsearch
    );

    let state = AppState {
        llm,
        job_search: Arc::new(job_search),
        scorer: Arc::new(WeightedJobScorer::default()),
        sessions: Arc::new(SessionStore::new(Duration::from_secs(config.cache_ttl))),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
