//! In-memory store of completed résumé analyses, keyed by analysis id.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::resume::analysis::ResumeAnalysis;
use crate::resume::profile::CandidateProfile;

#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub size_display: String,
    pub content_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub analysis_id: Uuid,
    pub file: FileInfo,
    pub analysis: ResumeAnalysis,
    pub profile: CandidateProfile,
    pub profile_summary: String,
    pub skill_categories: BTreeMap<String, Vec<String>>,
    pub created_at: DateTime<Utc>,
}

pub struct SessionStore {
    ttl: Duration,
    records: RwLock<HashMap<Uuid, (Instant, SessionRecord)>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a record and drops any that have outlived the TTL.
    pub async fn insert(&self, record: SessionRecord) {
        let mut records = self.records.write().await;
        let ttl = self.ttl;
        records.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        records.insert(record.analysis_id, (Instant::now(), record));
    }

    pub async fn get(&self, id: &Uuid) -> Option<SessionRecord> {
        {
            let records = self.records.read().await;
            match records.get(id) {
                Some((stored_at, record)) if stored_at.elapsed() < self.ttl => {
                    return Some(record.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }
        debug!("Analysis {id} expired");
        self.records.write().await.remove(id);
        None
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_record_expires_after_ttl() {
        let store = SessionStore::new(Duration::from_secs(60));
        let rec = record(CandidateProfile::fallback("test"));
        let id = rec.analysis_id;
        store.insert(rec).await;

        assert!(store.get(&id).await.is_some());
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.get(&id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_evicts_stale_records() {
        let store = SessionStore::new(Duration::from_secs(10));
        store.insert(record(CandidateProfile::fallback("old"))).await;
        tokio::time::advance(Duration::from_secs(11)).await;
        store.insert(record(CandidateProfile::fallback("new"))).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let store = SessionStore::new(Duration::from_secs(10));
        assert!(store.get(&Uuid::new_v4()).await.is_none());
    }
}
