//! CT Integrity: Coiled Tubing Reel Fatigue and Job Simulation
//!
//! Tracks cumulative low-cycle fatigue on coiled-tubing reels and checks
//! planned jobs against unit limits before dispatch.
//!
//! ## Architecture
//!
//! - **Physics Engine**: stress state, Palmgren-Miner accumulation, force and
//!   hydraulic profiles
//! - **Simulation**: job feasibility, time estimates and risk flags
//! - **Service**: per-reel serialized load, calculate, audit and commit
//! - **Storage**: sled-backed reel snapshots and fatigue audit trail
//! - **Acquisition**: JSON-lines and CSV telemetry readers

pub mod acquisition;
pub mod config;
pub mod physics_engine;
pub mod service;
pub mod simulation;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::EngineConfig;

// Re-export commonly used types
pub use types::{
    FatigueLogRecord, FatigueOutcome, FatigueStatus, FatigueUpdate, JobPlan, NewReel, PlannedJob,
    ReelState, Risk, RiskType, SimulationResult, SkipReason, TelemetrySample, TravelDirection,
};

// Re-export engines
pub use physics_engine::{FatigueAccumulator, FatigueError};
pub use simulation::{JobSimulator, SimulationError};

// Re-export service and storage
pub use service::{ReelFatigueService, ServiceError};
pub use storage::{FatigueStore, InMemoryStore, SledStore, StorageError};
