//! Reel Fatigue Service
//!
//! Owns the load → calculate → audit → commit cycle for each telemetry
//! sample. The accumulator is lock-free; this layer serializes updates per
//! reel with a keyed mutex so two ingest streams for the same reel cannot
//! interleave their read-modify-write, while different reels proceed in
//! parallel.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::physics_engine::{FatigueAccumulator, FatigueError};
use crate::simulation::{JobSimulator, SimulationError};
use crate::storage::{FatigueStore, StorageError};
use crate::types::{
    FatigueLogRecord, FatigueOutcome, FatigueStatus, JobPlan, NewReel, PlannedJob, ReelState,
    SimulationResult, TelemetrySample,
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("reel {0} not found")]
    ReelNotFound(Uuid),

    #[error("reel code '{code}' already exists for tenant {tenant_id}")]
    DuplicateReelCode { tenant_id: Uuid, code: String },

    #[error("reel code must not be empty")]
    EmptyReelCode,

    #[error(transparent)]
    Fatigue(#[from] FatigueError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct ReelFatigueService {
    store: Arc<dyn FatigueStore>,
    accumulator: FatigueAccumulator,
    reel_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    registration: Mutex<()>,
}

impl ReelFatigueService {
    pub fn new(store: Arc<dyn FatigueStore>, accumulator: FatigueAccumulator) -> Self {
        info!(backend = store.backend_name(), "Reel fatigue service ready");
        Self {
            store,
            accumulator,
            reel_locks: DashMap::new(),
            registration: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &dyn FatigueStore {
        self.store.as_ref()
    }

    /// Register a reel. Codes are unique per tenant.
    pub fn register_reel(
        &self,
        new_reel: NewReel,
        default_tenant: Uuid,
    ) -> Result<ReelState, ServiceError> {
        if new_reel.reel_code.trim().is_empty() {
            return Err(ServiceError::EmptyReelCode);
        }
        let tenant_id = new_reel.tenant_id.unwrap_or(default_tenant);

        let _guard = self
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self
            .store
            .find_reel_by_code(tenant_id, &new_reel.reel_code)?
            .is_some()
        {
            return Err(ServiceError::DuplicateReelCode {
                tenant_id,
                code: new_reel.reel_code,
            });
        }

        let reel = new_reel.into_state(tenant_id);
        self.store.save_reel(&reel)?;
        info!(
            reel_id = %reel.reel_id,
            reel_code = %reel.reel_code,
            grade = %reel.material_grade,
            "Registered reel"
        );
        Ok(reel)
    }

    pub fn reel(&self, reel_id: Uuid) -> Result<ReelState, ServiceError> {
        self.store
            .load_reel(reel_id)?
            .ok_or(ServiceError::ReelNotFound(reel_id))
    }

    /// Run one sample for a reel and commit it if accepted.
    ///
    /// The audit record is written before the reel snapshot; a failed audit
    /// write is logged and does not block the state update.
    pub fn process_sample(
        &self,
        reel_id: Uuid,
        sample: &TelemetrySample,
    ) -> Result<FatigueOutcome, ServiceError> {
        let lock = Arc::clone(&*self.reel_locks.entry(reel_id).or_default());
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut reel = self.reel(reel_id)?;
        let outcome = self.accumulator.calculate(sample, &reel)?;

        let Some(update) = outcome.update().cloned() else {
            return Ok(outcome);
        };

        let at = sample.timestamp.unwrap_or_else(Utc::now);
        let record =
            FatigueLogRecord::from_update(reel.tenant_id, reel.reel_id, sample.job_id, at, &update);
        if let Err(e) = self.store.append_log(&record) {
            warn!(reel_id = %reel_id, error = %e, "Failed to write fatigue log, continuing");
        }

        reel.apply(&update, at);
        self.store.save_reel(&reel)?;

        if update.status != FatigueStatus::Normal {
            warn!(
                reel_id = %reel_id,
                reel_code = %reel.reel_code,
                fatigue_percent = update.accumulated_fatigue_percent,
                status = %update.status,
                "Reel fatigue above normal band"
            );
        }
        Ok(outcome)
    }

    pub fn history(
        &self,
        reel_id: Uuid,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FatigueLogRecord>, ServiceError> {
        Ok(self.store.history(reel_id, offset, limit)?)
    }

    pub fn history_range(
        &self,
        reel_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FatigueLogRecord>, ServiceError> {
        Ok(self.store.history_range(reel_id, from, to)?)
    }

    pub fn latest_log(&self, reel_id: Uuid) -> Result<Option<FatigueLogRecord>, ServiceError> {
        Ok(self.store.latest_log(reel_id)?)
    }

    pub fn log_count(&self, reel_id: Uuid) -> Result<usize, ServiceError> {
        Ok(self.store.log_count(reel_id)?)
    }

    pub fn job_history(&self, job_id: Uuid) -> Result<Vec<FatigueLogRecord>, ServiceError> {
        Ok(self.store.job_history(job_id)?)
    }

    pub fn reels_above(
        &self,
        tenant_id: Option<Uuid>,
        threshold_percent: f64,
    ) -> Result<Vec<ReelState>, ServiceError> {
        Ok(self.store.reels_above(tenant_id, threshold_percent)?)
    }

    /// Simulate a dispatched job on a registered reel.
    pub fn simulate_job(
        &self,
        simulator: &JobSimulator,
        job: &PlannedJob,
        reel_id: Uuid,
    ) -> Result<SimulationResult, ServiceError> {
        let reel = self.reel(reel_id)?;
        let plan = JobPlan::for_reel(job, &reel);
        let result = simulator.simulate(&plan)?;
        info!(
            job_id = ?job.job_id,
            reel_id = %reel_id,
            feasible = result.feasibility.feasible,
            duration_hours = result.times.map_or(0.0, |t| t.total_hours),
            "Simulation completed for job"
        );
        Ok(result)
    }
}
