// Job search: provider clients, rate limiting, caching and result aggregation.
// All provider traffic goes through `search::JobSearchService`.

use thiserror::Error;

pub mod cache;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod retry;
pub mod search;
pub mod sources;

#[derive(Debug, Error)]
pub enum JobSearchError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("{provider} search timed out. Please try again.")]
    Timeout { provider: &'static str },

    #[error("{provider} search failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API returned status {status}")]
    Status { provider: &'static str, status: u16 },

    #[error("{provider} API access denied. Please verify API credentials and subscription.")]
    AccessDenied { provider: &'static str },

    #[error("{provider} API rate limit exceeded. Please try again later.")]
    RateLimited { provider: &'static str },

    #[error("{provider} returned an unreadable response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("All job search APIs failed: {0}")]
    AllFailed(String),
}

impl JobSearchError {
    /// The request URL is dropped; Adzuna carries its credentials in the query string.
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            JobSearchError::Timeout { provider }
        } else {
            JobSearchError::Http {
                provider,
                source: err,
            }
        }
    }

    /// Transport failures, 5xx and provider throttling are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            JobSearchError::Timeout { .. }
            | JobSearchError::Http { .. }
            | JobSearchError::RateLimited { .. } => true,
            JobSearchError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
