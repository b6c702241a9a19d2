//! Reel State and Fatigue Log Storage
//!
//! `FatigueStore` abstracts where reel snapshots and the fatigue audit trail
//! live so the service and CLI never touch a backend directly:
//! - `SledStore`: embedded, durable, the default for field units
//! - `InMemoryStore`: tests and dry runs

mod memory;
mod sled_store;

pub use memory::InMemoryStore;
pub use sled_store::SledStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{FatigueLogRecord, ReelState};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("corrupt key in tree {tree}")]
    CorruptKey { tree: &'static str },
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Pluggable backend for reels and their audit records.
///
/// Implementations must be `Send + Sync`; the service shares one store across
/// every ingest thread.
pub trait FatigueStore: Send + Sync {
    fn load_reel(&self, reel_id: Uuid) -> Result<Option<ReelState>, StorageError>;

    /// Insert or replace a reel snapshot.
    fn save_reel(&self, reel: &ReelState) -> Result<(), StorageError>;

    fn find_reel_by_code(
        &self,
        tenant_id: Uuid,
        reel_code: &str,
    ) -> Result<Option<ReelState>, StorageError>;

    /// All reels, or only one tenant's.
    fn list_reels(&self, tenant_id: Option<Uuid>) -> Result<Vec<ReelState>, StorageError>;

    fn append_log(&self, record: &FatigueLogRecord) -> Result<(), StorageError>;

    /// Newest first, skipping `offset` records.
    fn history(
        &self,
        reel_id: Uuid,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FatigueLogRecord>, StorageError>;

    /// Oldest first, both bounds inclusive.
    fn history_range(
        &self,
        reel_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FatigueLogRecord>, StorageError>;

    fn latest_log(&self, reel_id: Uuid) -> Result<Option<FatigueLogRecord>, StorageError> {
        Ok(self.history(reel_id, 0, 1)?.into_iter().next())
    }

    fn log_count(&self, reel_id: Uuid) -> Result<usize, StorageError>;

    /// Records tagged with a job, oldest first.
    fn job_history(&self, job_id: Uuid) -> Result<Vec<FatigueLogRecord>, StorageError>;

    /// Reels whose accumulated fatigue exceeds `threshold_percent`, worst first.
    fn reels_above(
        &self,
        tenant_id: Option<Uuid>,
        threshold_percent: f64,
    ) -> Result<Vec<ReelState>, StorageError> {
        let mut reels: Vec<_> = self
            .list_reels(tenant_id)?
            .into_iter()
            .filter(|r| r.accumulated_fatigue_percent > threshold_percent)
            .collect();
        reels.sort_by(|a, b| {
            b.accumulated_fatigue_percent
                .total_cmp(&a.accumulated_fatigue_percent)
        });
        Ok(reels)
    }

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}
