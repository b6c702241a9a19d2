//! Sled-backed fatigue store
//!
//! Trees:
//! - `reels`: reel id → JSON `ReelState`
//! - `fatigue_logs`: reel id ‖ timestamp ms (BE) ‖ sequence (BE) → JSON `FatigueLogRecord`
//! - `job_logs`: job id ‖ timestamp ms (BE) ‖ sequence (BE) → same record
//!
//! Big-endian timestamps make each reel's records sort chronologically under
//! its prefix; the sequence keeps same-millisecond records distinct.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::types::{FatigueLogRecord, ReelState};

use super::{FatigueStore, StorageError};

const REELS_TREE: &str = "reels";
const LOGS_TREE: &str = "fatigue_logs";
const JOB_LOGS_TREE: &str = "job_logs";

#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    reels: sled::Tree,
    logs: sled::Tree,
    job_logs: sled::Tree,
}

impl SledStore {
    /// Open or create the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        let store = Self::from_db(db)?;
        info!(path = %path.display(), reels = store.reels.len(), "Fatigue store opened");
        Ok(store)
    }

    /// Throwaway store that is deleted on drop.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            reels: db.open_tree(REELS_TREE)?,
            logs: db.open_tree(LOGS_TREE)?,
            job_logs: db.open_tree(JOB_LOGS_TREE)?,
            db,
        })
    }

    /// Block until all pending writes are on disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn size_bytes(&self) -> u64 {
        self.db.size_on_disk().unwrap_or(0)
    }

    fn log_key(prefix: Uuid, timestamp_ms: u64, sequence: u64) -> [u8; 32] {
        let mut key = [0u8; 32];
        key[..16].copy_from_slice(prefix.as_bytes());
        key[16..24].copy_from_slice(&timestamp_ms.to_be_bytes());
        key[24..].copy_from_slice(&sequence.to_be_bytes());
        key
    }

    fn millis(ts: DateTime<Utc>) -> u64 {
        u64::try_from(ts.timestamp_millis()).unwrap_or(0)
    }

    fn decode_all<I>(iter: I) -> Result<Vec<FatigueLogRecord>, StorageError>
    where
        I: Iterator<Item = sled::Result<(sled::IVec, sled::IVec)>>,
    {
        iter.map(|item| -> Result<FatigueLogRecord, StorageError> {
            let (_, value) = item?;
            Ok(serde_json::from_slice(&value)?)
        })
        .collect()
    }
}

impl FatigueStore for SledStore {
    fn load_reel(&self, reel_id: Uuid) -> Result<Option<ReelState>, StorageError> {
        match self.reels.get(reel_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save_reel(&self, reel: &ReelState) -> Result<(), StorageError> {
        let value = serde_json::to_vec(reel)?;
        self.reels.insert(reel.reel_id.as_bytes(), value)?;
        Ok(())
    }

    fn find_reel_by_code(
        &self,
        tenant_id: Uuid,
        reel_code: &str,
    ) -> Result<Option<ReelState>, StorageError> {
        Ok(self
            .list_reels(Some(tenant_id))?
            .into_iter()
            .find(|r| r.reel_code == reel_code))
    }

    fn list_reels(&self, tenant_id: Option<Uuid>) -> Result<Vec<ReelState>, StorageError> {
        let mut reels = Vec::new();
        for item in self.reels.iter() {
            let (_, value) = item?;
            let reel: ReelState = serde_json::from_slice(&value)?;
            if tenant_id.map_or(true, |t| t == reel.tenant_id) {
                reels.push(reel);
            }
        }
        Ok(reels)
    }

    fn append_log(&self, record: &FatigueLogRecord) -> Result<(), StorageError> {
        let value = serde_json::to_vec(record)?;
        let ts = Self::millis(record.timestamp);
        let sequence = self.db.generate_id()?;

        self.logs
            .insert(Self::log_key(record.reel_id, ts, sequence), value.clone())?;
        if let Some(job_id) = record.job_id {
            self.job_logs
                .insert(Self::log_key(job_id, ts, sequence), value)?;
        }
        Ok(())
    }

    fn history(
        &self,
        reel_id: Uuid,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FatigueLogRecord>, StorageError> {
        Self::decode_all(
            self.logs
                .scan_prefix(reel_id.as_bytes())
                .rev()
                .skip(offset)
                .take(limit),
        )
    }

    fn history_range(
        &self,
        reel_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FatigueLogRecord>, StorageError> {
        if to < from {
            return Ok(Vec::new());
        }
        let start = Self::log_key(reel_id, Self::millis(from), 0);
        let end = Self::log_key(reel_id, Self::millis(to), u64::MAX);
        Self::decode_all(self.logs.range(start..=end))
    }

    fn latest_log(&self, reel_id: Uuid) -> Result<Option<FatigueLogRecord>, StorageError> {
        match self.logs.scan_prefix(reel_id.as_bytes()).next_back() {
            Some(item) => {
                let (_, value) = item?;
                Ok(Some(serde_json::from_slice(&value)?))
            }
            None => Ok(None),
        }
    }

    fn log_count(&self, reel_id: Uuid) -> Result<usize, StorageError> {
        let mut count = 0;
        for item in self.logs.scan_prefix(reel_id.as_bytes()).keys() {
            let key = item?;
            if key.len() != 32 {
                return Err(StorageError::CorruptKey { tree: LOGS_TREE });
            }
            count += 1;
        }
        Ok(count)
    }

    fn job_history(&self, job_id: Uuid) -> Result<Vec<FatigueLogRecord>, StorageError> {
        Self::decode_all(self.job_logs.scan_prefix(job_id.as_bytes()))
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_key_orders_by_time_then_sequence() {
        let id = Uuid::new_v4();
        let a = SledStore::log_key(id, 1_000, 5);
        let b = SledStore::log_key(id, 1_000, 6);
        let c = SledStore::log_key(id, 2_000, 0);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_pre_epoch_timestamp_clamps() {
        let ts = Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(SledStore::millis(ts), 0);
    }

    #[test]
    fn test_reel_round_trip_temporary_db() {
        let store = SledStore::temporary().unwrap();
        let reel = crate::types::NewReel::new("R-55").into_state(Uuid::new_v4());
        store.save_reel(&reel).unwrap();
        assert_eq!(store.load_reel(reel.reel_id).unwrap(), Some(reel.clone()));
        assert!(store.load_reel(Uuid::new_v4()).unwrap().is_none());
        assert_eq!(store.backend_name(), "sled");
    }
}
