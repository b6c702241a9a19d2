//! Physics Engine Module
//!
//! Closed-form tubing mechanics. Everything here is deterministic and
//! synchronous; the only shared state is the read-only material catalog.
//!
//! ## Per-sample (fatigue tracking)
//! - `compute_stresses()` - hoop, axial, bending and combined stress
//! - `FatigueAccumulator::calculate()` - one Palmgren-Miner increment
//!
//! ## Per-plan (job simulation)
//! - `ForceProfiler::profile()` - hookload, drag and buckling margin vs depth
//! - `HydraulicProfiler::profile()` - pumping pressure vs depth

pub mod fatigue;
pub mod forces;
pub mod hydraulics;
pub mod materials;
pub mod precision;
pub mod stress;

pub use fatigue::{FatigueAccumulator, FatigueError};
pub use forces::ForceProfiler;
pub use hydraulics::HydraulicProfiler;
pub use materials::{corrosion_factor, known_grades, lookup, MaterialProperties};
pub use precision::round_half_up;
pub use stress::{compute_stresses, von_mises, TubingGeometry};
