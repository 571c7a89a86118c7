//! Aggregated job search across every configured provider.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::jobs::cache::JobCache;
use crate::jobs::models::JobPosting;
use crate::jobs::rate_limit::RateLimiter;
use crate::jobs::retry::retry_with_backoff;
use crate::jobs::sources::{
    AdzunaSource, JSearchSource, JobQuery, JobSource, RemotiveSource, USER_AGENT,
};
use crate::jobs::JobSearchError;

const MIN_QUERY_CHARS: usize = 2;
const MAX_QUERY_CHARS: usize = 100;
const MAX_LOCATION_CHARS: usize = 50;
/// Providers that accept a page size each get this share of the requested results.
const PROVIDER_SHARE: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    pub cache_size: usize,
    pub rate_limits: BTreeMap<String, usize>,
    pub timestamp: DateTime<Utc>,
}

pub fn validate_query(query: &str, location: Option<&str>) -> Result<(), JobSearchError> {
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        return Err(JobSearchError::InvalidQuery(
            "Search query must be at least 2 characters long".to_string(),
        ));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(JobSearchError::InvalidQuery(
            "Search query too long (max 100 characters)".to_string(),
        ));
    }
    if location.is_some_and(|l| l.chars().count() > MAX_LOCATION_CHARS) {
        return Err(JobSearchError::InvalidQuery(
            "Location query too long (max 50 characters)".to_string(),
        ));
    }
    Ok(())
}

pub struct JobSearchService {
    sources: Vec<Arc<dyn JobSource>>,
    limiters: HashMap<&'static str, RateLimiter>,
    cache: JobCache,
    retry_attempts: u32,
    retry_base: Duration,
}

impl JobSearchService {
    pub fn new(sources: Vec<Arc<dyn JobSource>>, cache_ttl: Duration, retry_attempts: u32) -> Self {
        let limiters = sources
            .iter()
            .map(|s| (s.name(), RateLimiter::for_provider(s.name())))
            .collect();
        Self {
            sources,
            limiters,
            cache: JobCache::new(cache_ttl),
            retry_attempts,
            retry_base: Duration::from_secs(1),
        }
    }

    /// Builds the Adzuna, Remotive and JSearch sources from configuration.
    pub fn from_config(config: &Config) -> Result<Self, JobSearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| JobSearchError::from_reqwest("HTTP client", e))?;

        let sources: Vec<Arc<dyn JobSource>> = vec![
            Arc::new(AdzunaSource::new(
                client.clone(),
                config.adzuna_app_id.clone(),
                config.adzuna_app_key.clone(),
                config.max_jobs_per_search,
            )),
            Arc::new(RemotiveSource::new(client.clone())),
            Arc::new(JSearchSource::new(
                client,
                config.rapidapi_key.clone(),
                config.max_jobs_per_search,
            )),
        ];

        Ok(Self::new(
            sources,
            Duration::from_secs(config.cache_ttl),
            config.retry_attempts,
        ))
    }

    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    /// Searches every provider, de-duplicates by (title, company) and orders by
    /// query relevance. Fails only if every provider failed and nothing was found.
    pub async fn search_all(
        &self,
        query: &str,
        location: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<JobPosting>, JobSearchError> {
        if query.trim().is_empty() {
            return Err(JobSearchError::InvalidQuery(
                "Search query is required and cannot be empty".to_string(),
            ));
        }
        let location = location.map(str::trim).filter(|l| !l.is_empty());
        validate_query(query, location)?;

        let job_query = JobQuery {
            query: query.trim().to_string(),
            location: location.map(String::from),
            page: 1,
            results: (max_results / PROVIDER_SHARE).max(1),
        };

        let mut all_jobs = Vec::new();
        let mut errors = Vec::new();

        for source in &self.sources {
            match self.search_source(source.as_ref(), &job_query).await {
                Ok(jobs) => {
                    info!("Successfully retrieved {} jobs from {}", jobs.len(), source.name());
                    all_jobs.extend(jobs);
                }
                Err(e) => {
                    let msg = format!("Failed to search {}: {e}", source.name());
                    error!("{msg}");
                    errors.push(msg);
                }
            }
        }

        let mut unique = dedup_jobs(all_jobs);
        info!(
            "Retrieved {} unique jobs from {} APIs",
            unique.len(),
            self.sources.len()
        );

        if !errors.is_empty() {
            if unique.is_empty() {
                return Err(JobSearchError::AllFailed(errors.join("; ")));
            }
            warn!("Some APIs failed but got results: {}", errors.join("; "));
        }

        sort_by_relevance(&mut unique, query);
        unique.truncate(max_results);
        Ok(unique)
    }

    async fn search_source(
        &self,
        source: &dyn JobSource,
        query: &JobQuery,
    ) -> Result<Vec<JobPosting>, JobSearchError> {
        if !source.is_configured() {
            warn!("{} credentials not configured, skipping", source.name());
            return Ok(vec![]);
        }

        let key = JobCache::key(
            source.name(),
            &query.query,
            &source.effective_location(query),
            query.page,
            query.results,
        );
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        if let Some(limiter) = self.limiters.get(source.name()) {
            limiter.acquire().await;
        }

        let jobs = retry_with_backoff(
            source.name(),
            self.retry_attempts,
            self.retry_base,
            JobSearchError::is_retryable,
            || source.search(query),
        )
        .await?;

        if !jobs.is_empty() {
            self.cache.insert(key, jobs.clone()).await;
        }
        Ok(jobs)
    }

    pub async fn stats(&self) -> SearchStats {
        let mut rate_limits = BTreeMap::new();
        for (name, limiter) in &self.limiters {
            rate_limits.insert(name.to_lowercase(), limiter.calls_in_window().await);
        }
        SearchStats {
            cache_size: self.cache.len().await,
            rate_limits,
            timestamp: Utc::now(),
        }
    }
}

/// Keeps the first posting for each (title, company) pair.
pub fn dedup_jobs(jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| seen.insert(job.dedup_key()))
        .collect()
}

/// Stable sort: query in title, then query in description, then JSearch first.
pub fn sort_by_relevance(jobs: &mut [JobPosting], query: &str) {
    let q = query.trim().to_lowercase();
    jobs.sort_by_cached_key(|job| {
        std::cmp::Reverse((
            job.title.to_lowercase().contains(&q),
            job.description.to_lowercase().contains(&q),
            job.source == "JSearch",
        ))
    });
}
