//! Shared data structures for reel fatigue tracking and job simulation
//!
//! - `reel`: ReelState, TravelDirection, NewReel registration
//! - `fatigue`: TelemetrySample in, FatigueOutcome / FatigueUpdate out, FatigueLogRecord audit rows
//! - `job`: JobPlan in, SimulationResult out

mod reel;
mod fatigue;
mod job;

pub use reel::*;
pub use fatigue::*;
pub use job::*;
