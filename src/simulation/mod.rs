//! Job Simulation Module
//!
//! Pre-job feasibility and engineering profile for a coiled-tubing run:
//!
//! 1. Feasibility (depth vs string length, pressure vs unit rating, OD vs hole)
//! 2. Force profile and, when pumping, hydraulic profile
//! 3. Time breakdown and a flat fatigue-consumption estimate
//! 4. Risk identification
//!
//! Nothing here is persisted; every call is independent.

mod plan;
mod risks;
mod simulator;

pub use risks::identify_risks;
pub use simulator::JobSimulator;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid job plan field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Well name is required")]
    MissingWellName,

    #[error("Target depth must be positive (got {0})")]
    NonPositiveDepth(f64),

    #[error("simulation for well {well} produced non-finite {field}")]
    NonFinite { well: String, field: &'static str },
}
