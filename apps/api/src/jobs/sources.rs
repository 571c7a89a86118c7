//! Provider clients. Each source turns one search into one HTTP GET and maps the
//! provider's JSON into `JobPosting`s. Items that fail to parse are skipped.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::jobs::models::{truncate_chars, JobPosting, MAX_DESCRIPTION_CHARS};
use crate::jobs::JobSearchError;

pub const ADZUNA_API_BASE: &str = "https://api.adzuna.com";
pub const REMOTIVE_API_BASE: &str = "https://remotive.com";
pub const JSEARCH_API_BASE: &str = "https://jsearch.p.rapidapi.com";
const JSEARCH_HOST: &str = "jsearch.p.rapidapi.com";
pub const USER_AGENT: &str = "ResumeAnalyzer/1.0";

const ADZUNA_DEFAULT_COUNTRY: &str = "in";
const ADZUNA_DEFAULT_LOCATION: &str = "India";

/// One provider search.
#[derive(Debug, Clone)]
pub struct JobQuery {
    pub query: String,
    pub location: Option<String>,
    pub page: u32,
    /// Requested page size; sources cap it at their configured maximum.
    pub results: usize,
}

#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sources with missing credentials are skipped rather than failing the search.
    fn is_configured(&self) -> bool {
        true
    }

    /// Location used for cache keys, after the source applies its defaults.
    fn effective_location(&self, query: &JobQuery) -> String {
        query.location.clone().unwrap_or_default()
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, JobSearchError>;
}

async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<T, JobSearchError> {
    let response = request
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .map_err(|e| JobSearchError::from_reqwest(provider, e))?;

    match response.status() {
        StatusCode::FORBIDDEN => {
            warn!("{provider} API returned 403 Forbidden - check API key and subscription");
            return Err(JobSearchError::AccessDenied { provider });
        }
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("{provider} API rate limit exceeded");
            return Err(JobSearchError::RateLimited { provider });
        }
        status if !status.is_success() => {
            return Err(JobSearchError::Status {
                provider,
                status: status.as_u16(),
            });
        }
        _ => {}
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            JobSearchError::Timeout { provider }
        } else {
            JobSearchError::Decode {
                provider,
                message: e.to_string(),
            }
        }
    })
}

/// Parses each raw item independently so one bad record does not drop the page.
fn parse_items<T, F>(provider: &'static str, items: Vec<Value>, map: F) -> Vec<JobPosting>
where
    T: DeserializeOwned,
    F: Fn(T) -> JobPosting,
{
    let jobs: Vec<JobPosting> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(map(parsed)),
            Err(e) => {
                warn!("Error parsing {provider} job item: {e}");
                None
            }
        })
        .collect();
    info!("Retrieved {} jobs from {provider}", jobs.len());
    jobs
}

fn or_na(value: Option<String>) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "N/A".to_string())
}

fn description(value: Option<String>) -> String {
    truncate_chars(&value.unwrap_or_default(), MAX_DESCRIPTION_CHARS)
}

// ────────────────────────────────────────────────────────────────────────────
// Adzuna
// ────────────────────────────────────────────────────────────────────────────

pub struct AdzunaSource {
    client: Client,
    base_url: String,
    app_id: Option<String>,
    app_key: Option<String>,
    country: String,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct AdzunaResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct AdzunaJob {
    title: Option<String>,
    company: Option<DisplayName>,
    location: Option<DisplayName>,
    description: Option<String>,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    redirect_url: Option<String>,
    created: Option<String>,
    contract_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DisplayName {
    display_name: Option<String>,
}

impl AdzunaSource {
    pub fn new(
        client: Client,
        app_id: Option<String>,
        app_key: Option<String>,
        max_results: usize,
    ) -> Self {
        Self {
            client,
            base_url: ADZUNA_API_BASE.to_string(),
            app_id,
            app_key,
            country: ADZUNA_DEFAULT_COUNTRY.to_string(),
            max_results,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl JobSource for AdzunaSource {
    fn name(&self) -> &'static str {
        "Adzuna"
    }

    fn is_configured(&self) -> bool {
        self.app_id.is_some() && self.app_key.is_some()
    }

    fn effective_location(&self, query: &JobQuery) -> String {
        query
            .location
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| ADZUNA_DEFAULT_LOCATION.to_string())
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, JobSearchError> {
        let (Some(app_id), Some(app_key)) = (&self.app_id, &self.app_key) else {
            warn!("Adzuna API credentials not configured");
            return Ok(vec![]);
        };

        let location = self.effective_location(query);
        let url = format!(
            "{}/v1/api/jobs/{}/search/{}",
            self.base_url, self.country, query.page
        );
        let results_per_page = query.results.min(self.max_results).to_string();

        info!("Searching Adzuna for '{}' in '{}'", query.query, location);
        let request = self.client.get(url).query(&[
            ("app_id", app_id.as_str()),
            ("app_key", app_key.as_str()),
            ("what", query.query.trim()),
            ("where", location.trim()),
            ("results_per_page", results_per_page.as_str()),
            ("content-type", "application/json"),
        ]);

        let body: AdzunaResponse = send_json(self.name(), request).await?;
        Ok(parse_items(self.name(), body.results, |job: AdzunaJob| JobPosting {
            title: or_na(job.title),
            company: or_na(job.company.and_then(|c| c.display_name)),
            location: or_na(job.location.and_then(|l| l.display_name)),
            description: description(job.description),
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            apply_url: job.redirect_url,
            source: "Adzuna".to_string(),
            date_posted: job.created,
            job_type: job.contract_type,
            experience_level: None,
        }))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Remotive
// ────────────────────────────────────────────────────────────────────────────

pub struct RemotiveSource {
    client: Client,
    base_url: String,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    #[serde(default)]
    jobs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    title: Option<String>,
    company_name: Option<String>,
    candidate_required_location: Option<String>,
    description: Option<String>,
    url: Option<String>,
    publication_date: Option<String>,
}

impl RemotiveSource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: REMOTIVE_API_BASE.to_string(),
            category: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[async_trait]
impl JobSource for RemotiveSource {
    fn name(&self) -> &'static str {
        "Remotive"
    }

    // Remotive has no location filter; every listing is remote.
    fn effective_location(&self, _query: &JobQuery) -> String {
        String::new()
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, JobSearchError> {
        let mut params = vec![("search", query.query.trim().to_string())];
        if let Some(category) = &self.category {
            params.push(("category", category.trim().to_string()));
        }

        info!("Searching Remotive for '{}'", query.query);
        let request = self
            .client
            .get(format!("{}/api/remote-jobs", self.base_url))
            .query(&params);

        let body: RemotiveResponse = send_json(self.name(), request).await?;
        Ok(parse_items(self.name(), body.jobs, |job: RemotiveJob| JobPosting {
            title: or_na(job.title),
            company: or_na(job.company_name),
            location: job
                .candidate_required_location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "Remote".to_string()),
            description: description(job.description),
            salary_min: None,
            salary_max: None,
            apply_url: job.url,
            source: "Remotive".to_string(),
            date_posted: job.publication_date,
            job_type: Some("Remote".to_string()),
            experience_level: None,
        }))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// JSearch (RapidAPI)
// ────────────────────────────────────────────────────────────────────────────

pub struct JSearchSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct JSearchResponse {
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct JSearchJob {
    job_title: Option<String>,
    employer_name: Option<String>,
    job_city: Option<String>,
    job_country: Option<String>,
    job_description: Option<String>,
    job_min_salary: Option<f64>,
    job_max_salary: Option<f64>,
    job_apply_link: Option<String>,
    job_posted_at_datetime_utc: Option<String>,
    job_employment_type: Option<String>,
    job_experience_in_place_of_education: Option<Value>,
}

impl JSearchSource {
    pub fn new(client: Client, api_key: Option<String>, max_results: usize) -> Self {
        Self {
            client,
            base_url: JSEARCH_API_BASE.to_string(),
            api_key,
            max_results,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl JobSource for JSearchSource {
    fn name(&self) -> &'static str {
        "JSearch"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, JobSearchError> {
        let Some(api_key) = &self.api_key else {
            warn!("JSearch/RapidAPI key not configured");
            return Ok(vec![]);
        };

        let mut params = vec![
            ("query", query.query.trim().to_string()),
            ("page", query.page.to_string()),
            ("num_pages", "1".to_string()),
            (
                "results_per_page",
                query.results.min(self.max_results).to_string(),
            ),
        ];
        if let Some(location) = query.location.as_deref().filter(|l| !l.trim().is_empty()) {
            params.push(("location", location.trim().to_string()));
        }

        info!(
            "Searching JSearch for '{}' in '{}'",
            query.query,
            query.location.as_deref().unwrap_or("any location")
        );
        let request = self
            .client
            .get(format!("{}/search", self.base_url))
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", JSEARCH_HOST)
            .query(&params);

        let body: JSearchResponse = send_json(self.name(), request).await?;
        Ok(parse_items(self.name(), body.data, |job: JSearchJob| JobPosting {
            title: or_na(job.job_title),
            company: or_na(job.employer_name),
            location: or_na(job.job_city.filter(|c| !c.trim().is_empty()).or(job.job_country)),
            description: description(job.job_description),
            salary_min: job.job_min_salary,
            salary_max: job.job_max_salary,
            apply_url: job.job_apply_link,
            source: "JSearch".to_string(),
            date_posted: job.job_posted_at_datetime_utc,
            job_type: job.job_employment_type,
            experience_level: job
                .job_experience_in_place_of_education
                .and_then(|v| v.as_str().map(String::from)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn query(q: &str, location: Option<&str>) -> JobQuery {
        JobQuery {
            query: q.to_string(),
            location: location.map(String::from),
            page: 1,
            results: 16,
        }
    }

    #[tokio::test]
    async fn test_adzuna_maps_results_and_sends_credentials() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/api/jobs/in/search/1")
                    .query_param("app_id", "id")
                    .query_param("app_key", "key")
                    .query_param("what", "rust developer")
                    .query_param("where", "India")
                    .query_param("results_per_page", "10")
                    .header("User-Agent", USER_AGENT);
                then.status(200).json_body(json!({
                    "results": [
                        {
                            "title": "Rust Developer",
                            "company": {"display_name": "Ferrous"},
                            "location": {"display_name": "Bengaluru"},
                            "description": "Build async services",
                            "salary_min": 1200000,
                            "salary_max": 1800000.5,
                            "redirect_url": "https://adzuna.example/1",
                            "created": "2026-10-01T00:00:00Z",
                            "contract_type": "permanent"
                        },
                        {"title": 42},
                        {"company": null}
                    ]
                }));
            })
            .await;

        let source = AdzunaSource::new(
            Client::new(),
            Some("id".to_string()),
            Some("key".to_string()),
            10,
        )
        .with_base_url(server.base_url());
        let jobs = source.search(&query("rust developer", None)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].company, "Ferrous");
        assert_eq!(jobs[0].salary_min, Some(1_200_000.0));
        assert_eq!(jobs[0].job_type.as_deref(), Some("permanent"));
        assert_eq!(jobs[1].title, "N/A");
        assert_eq!(jobs[1].company, "N/A");
    }

    #[tokio::test]
    async fn test_adzuna_without_credentials_returns_nothing() {
        let source = AdzunaSource::new(Client::new(), None, Some("key".to_string()), 10)
            .with_base_url("http://127.0.0.1:9");
        assert!(!source.is_configured());
        assert!(source.search(&query("rust", None)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remotive_defaults_location_and_truncates_description() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/remote-jobs")
                    .query_param("search", "rust");
                then.status(200).json_body(json!({
                    "jobs": [{
                        "title": "Remote Rustacean",
                        "company_name": "Crab Co",
                        "candidate_required_location": "",
                        "description": "y".repeat(1500),
                        "url": "https://remotive.example/1",
                        "publication_date": "2026-10-10"
                    }]
                }));
            })
            .await;

        let source = RemotiveSource::new(Client::new()).with_base_url(server.base_url());
        let jobs = source.search(&query("rust", None)).await.unwrap();
        assert_eq!(jobs[0].location, "Remote");
        assert_eq!(jobs[0].job_type.as_deref(), Some("Remote"));
        assert_eq!(jobs[0].description.len(), MAX_DESCRIPTION_CHARS);
    }

    #[tokio::test]
    async fn test_jsearch_sends_rapidapi_headers_and_falls_back_to_country() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .header("X-RapidAPI-Key", "rapid")
                    .header("X-RapidAPI-Host", JSEARCH_HOST)
                    .query_param("query", "rust")
                    .query_param("location", "Berlin")
                    .query_param("num_pages", "1");
                then.status(200).json_body(json!({
                    "data": [{
                        "job_title": "Systems Engineer",
                        "employer_name": "Tokio Labs",
                        "job_city": null,
                        "job_country": "DE",
                        "job_description": "Rust and Linux",
                        "job_employment_type": "FULLTIME",
                        "job_experience_in_place_of_education": false
                    }]
                }));
            })
            .await;

        let source = JSearchSource::new(Client::new(), Some("rapid".to_string()), 50)
            .with_base_url(server.base_url());
        let jobs = source.search(&query("rust", Some("Berlin"))).await.unwrap();
        mock.assert_async().await;
        assert_eq!(jobs[0].location, "DE");
        assert_eq!(jobs[0].source, "JSearch");
        assert!(jobs[0].experience_level.is_none());
    }

    #[tokio::test]
    async fn test_jsearch_forbidden_is_access_denied() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(403);
            })
            .await;

        let source = JSearchSource::new(Client::new(), Some("bad".to_string()), 50)
            .with_base_url(server.base_url());
        let err = source.search(&query("rust", None)).await.unwrap_err();
        assert!(matches!(err, JobSearchError::AccessDenied { provider: "JSearch" }));
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/remote-jobs");
                then.status(429);
            })
            .await;

        let source = RemotiveSource::new(Client::new()).with_base_url(server.base_url());
        let err = source.search(&query("rust", None)).await.unwrap_err();
        assert!(matches!(err, JobSearchError::RateLimited { .. }));
        assert!(err.is_retryable());
    }
}
