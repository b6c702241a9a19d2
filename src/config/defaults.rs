//! Fixed constants that are not operator-tunable.
//!
//! Engine constants live in `EngineConfig`; these are the values that describe
//! data identity (catalog keys, tags) or CLI/storage plumbing.

// ============================================================================
// Fatigue
// ============================================================================

/// Grade used when a reel names a grade that is not in the material catalog.
pub const DEFAULT_MATERIAL_GRADE: &str = "QT-800";

/// Method tag written to reel state and every audit record.
pub const FATIGUE_METHOD: &str = "PALMGREN_MINER";

/// Temperature assumed when a sample does not carry one (°F).
pub const DEFAULT_TEMPERATURE_F: f64 = 70.0;

/// Weld stress-concentration factor for reels without weld data.
pub const DEFAULT_WELD_FACTOR: f64 = 1.0;

// ============================================================================
// Reel Registration
// ============================================================================

pub const DEFAULT_TUBING_OD_IN: f64 = 2.375;
pub const DEFAULT_TUBING_ID_IN: f64 = 1.995;
pub const DEFAULT_GOOSENECK_RADIUS_IN: f64 = 72.0;
pub const DEFAULT_REEL_CORE_DIAMETER_IN: f64 = 96.0;
pub const DEFAULT_CORROSION_ENVIRONMENT: &str = "SWEET";

// ============================================================================
// Job Plan
// ============================================================================

/// Fallbacks applied when a plan is built from a job record with gaps.
pub const DEFAULT_TARGET_DEPTH_FT: f64 = 10_000.0;
pub const DEFAULT_WELLBORE_DIAMETER_IN: f64 = 7.0;
pub const DEFAULT_MAX_INCLINATION_DEG: f64 = 30.0;
pub const DEFAULT_TUBING_LENGTH_FT: f64 = 20_000.0;
pub const DEFAULT_FLUID_DENSITY_PPG: f64 = 8.33;
pub const DEFAULT_MAX_PRESSURE_PSI: f64 = 15_000.0;
pub const DEFAULT_RUNNING_SPEED_FT_MIN: f64 = 60.0;
pub const DEFAULT_UNIT_PRESSURE_CAPACITY_PSI: f64 = 35_000.0;
pub const DEFAULT_UNIT_TENSION_CAPACITY_LBF: f64 = 80_000.0;
pub const DEFAULT_TREATMENT_HOURS: f64 = 2.0;

// ============================================================================
// Storage
// ============================================================================

/// Sled directory when `[storage] path` is not set.
pub const DEFAULT_STORAGE_PATH: &str = "./data/ct_integrity.sled";

/// History rows returned by the CLI when `--limit` is not given.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

// ============================================================================
// Trip Simulator
// ============================================================================

/// Base delay between emitted samples at `--speed 1` (ms).
pub const TRIP_SIM_BASE_DELAY_MS: u64 = 1_000;
