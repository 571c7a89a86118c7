//! In-memory TTL cache for provider search results.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

use crate::jobs::models::JobPosting;

pub struct JobCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Vec<JobPosting>)>>,
}

impl JobCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn key(provider: &str, query: &str, location: &str, page: u32, results: usize) -> String {
        format!(
            "{provider}|{}|{}|{page}|{results}",
            query.trim().to_lowercase(),
            location.trim().to_lowercase()
        )
    }

    /// Returns a clone of the cached results; expired entries are dropped on read.
    pub async fn get(&self, key: &str) -> Option<Vec<JobPosting>> {
        let mut entries = self.entries.lock().await;
        let (stored_at, jobs) = entries.get(key)?;
        if stored_at.elapsed() < self.ttl {
            info!("Cache hit for key: {key}");
            return Some(jobs.clone());
        }
        entries.remove(key);
        None
    }

    /// Stores results and drops every entry that has outlived the TTL.
    pub async fn insert(&self, key: String, jobs: Vec<JobPosting>) {
        info!("Cached {} results for key: {key}", jobs.len());
        let ttl = self.ttl;
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert(key, (Instant::now(), jobs));
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
