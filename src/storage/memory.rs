//! In-memory fatigue store for tests and dry runs
//!
//! Thread-safe via `RwLock`. Not durable; everything is lost on drop.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{FatigueLogRecord, ReelState};

use super::{FatigueStore, StorageError};

#[derive(Default)]
pub struct InMemoryStore {
    reels: RwLock<HashMap<Uuid, ReelState>>,
    /// Append order; stable sorts by timestamp keep ties in arrival order.
    logs: RwLock<Vec<FatigueLogRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn reel_logs(&self, reel_id: Uuid) -> Vec<FatigueLogRecord> {
        let logs = self.logs.read().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<_> = logs.iter().filter(|r| r.reel_id == reel_id).cloned().collect();
        out.sort_by_key(|r| r.timestamp);
        out
    }
}

impl FatigueStore for InMemoryStore {
    fn load_reel(&self, reel_id: Uuid) -> Result<Option<ReelState>, StorageError> {
        let reels = self.reels.read().unwrap_or_else(PoisonError::into_inner);
        Ok(reels.get(&reel_id).cloned())
    }

    fn save_reel(&self, reel: &ReelState) -> Result<(), StorageError> {
        let mut reels = self.reels.write().unwrap_or_else(PoisonError::into_inner);
        reels.insert(reel.reel_id, reel.clone());
        Ok(())
    }

    fn find_reel_by_code(
        &self,
        tenant_id: Uuid,
        reel_code: &str,
    ) -> Result<Option<ReelState>, StorageError> {
        let reels = self.reels.read().unwrap_or_else(PoisonError::into_inner);
        Ok(reels
            .values()
            .find(|r| r.tenant_id == tenant_id && r.reel_code == reel_code)
            .cloned())
    }

    fn list_reels(&self, tenant_id: Option<Uuid>) -> Result<Vec<ReelState>, StorageError> {
        let reels = self.reels.read().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<_> = reels
            .values()
            .filter(|r| tenant_id.map_or(true, |t| t == r.tenant_id))
            .cloned()
            .collect();
        out.sort_by_key(|r| r.reel_id);
        Ok(out)
    }

    fn append_log(&self, record: &FatigueLogRecord) -> Result<(), StorageError> {
        let mut logs = self.logs.write().unwrap_or_else(PoisonError::into_inner);
        logs.push(record.clone());
        Ok(())
    }

    fn history(
        &self,
        reel_id: Uuid,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FatigueLogRecord>, StorageError> {
        Ok(self
            .reel_logs(reel_id)
            .into_iter()
            .rev()
            .skip(offset)
            .take(limit)
            .collect())
    }

    fn history_range(
        &self,
        reel_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FatigueLogRecord>, StorageError> {
        Ok(self
            .reel_logs(reel_id)
            .into_iter()
            .filter(|r| r.timestamp >= from && r.timestamp <= to)
            .collect())
    }

    fn log_count(&self, reel_id: Uuid) -> Result<usize, StorageError> {
        let logs = self.logs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(logs.iter().filter(|r| r.reel_id == reel_id).count())
    }

    fn job_history(&self, job_id: Uuid) -> Result<Vec<FatigueLogRecord>, StorageError> {
        let logs = self.logs.read().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<_> = logs
            .iter()
            .filter(|r| r.job_id == Some(job_id))
            .cloned()
            .collect();
        out.sort_by_key(|r| r.timestamp);
        Ok(out)
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
