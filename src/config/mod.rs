//! Engine Configuration Module
//!
//! Every constant the fatigue accumulator and job simulator use is loaded
//! from TOML so a site can tune friction, thresholds and timings without a
//! rebuild.
//!
//! ## Loading Order
//!
//! 1. `CT_INTEGRITY_CONFIG` environment variable (path to TOML file)
//! 2. `ct_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(EngineConfig::load());
//!
//! // Anywhere after:
//! let steps = config::get().simulation.discretization_steps;
//! ```
//!
//! Library code never requires `init()`: `get()` falls back to defaults, and
//! the engines take their config by value so tests can build them directly.

mod engine_config;
pub mod defaults;
pub mod validation;

pub use engine_config::*;

use std::sync::OnceLock;

/// Process-wide configuration, set once at startup.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Install the process-wide configuration. Later calls are ignored.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, keeping the first config");
    }
}

/// The process-wide configuration, or built-in defaults if `init()` was never called.
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::default)
}

/// Whether `init()` (or a defaulting `get()`) has already populated the config.
pub fn is_initialized() -> bool {
    ENGINE_CONFIG.get().is_some()
}
