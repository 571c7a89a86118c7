use anyhow::{Context, Result};
use serde::Serialize;

/// Application configuration loaded from environment variables.
/// Startup fails if `GOOGLE_API_KEY` is missing or a numeric variable does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
    pub rapidapi_key: Option<String>,
    pub max_file_size_mb: u64,
    pub log_level: String,
    /// Seconds a cached job search or stored analysis stays valid.
    pub cache_ttl: u64,
    pub max_jobs_per_search: usize,
    pub api_timeout_secs: u64,
    pub retry_attempts: u32,
    pub port: u16,
}

/// Which job providers have credentials. Keys themselves are never reported.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub gemini: bool,
    pub adzuna: bool,
    pub remotive: bool,
    pub jsearch: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            google_api_key: optional("GOOGLE_API_KEY")
                .context("Missing required API keys: GOOGLE_API_KEY")?,
            adzuna_app_id: optional("ADZUNA_APP_ID"),
            adzuna_app_key: optional("ADZUNA_APP_KEY"),
            rapidapi_key: optional("RAPIDAPI_KEY"),
            max_file_size_mb: parse_or(&lookup, "MAX_FILE_SIZE_MB", 10)?,
            log_level: optional("LOG_LEVEL")
                .map(|v| v.trim().to_lowercase())
                .unwrap_or_else(|| "info".to_string()),
            cache_ttl: parse_or(&lookup, "CACHE_TTL", 3600)?,
            max_jobs_per_search: parse_or(&lookup, "MAX_JOBS_PER_SEARCH", 50)?,
            api_timeout_secs: parse_or(&lookup, "API_TIMEOUT_SECS", 30)?,
            retry_attempts: parse_or::<u32, _>(&lookup, "RETRY_ATTEMPTS", 3)?.max(1),
            port: parse_or(&lookup, "PORT", 8080)?,
        })
    }

    pub fn file_size_limit_bytes(&self) -> usize {
        (self.max_file_size_mb * 1024 * 1024) as usize
    }

    pub fn provider_status(&self) -> ProviderStatus {
        ProviderStatus {
            gemini: !self.google_api_key.is_empty(),
            adzuna: self.adzuna_app_id.is_some() && self.adzuna_app_key.is_some(),
            remotive: true,
            jsearch: self.rapidapi_key.is_some(),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
