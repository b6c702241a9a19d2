//! Engine Configuration - every fatigue and simulation constant as an operator-tunable TOML value
//!
//! Each struct implements `Default` with the values the field crews have been running with,
//! so a deployment without a config file behaves exactly like the historical calculations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable pointing at the config file.
pub const CONFIG_ENV_VAR: &str = "CT_INTEGRITY_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "ct_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a CT service site.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. `$CT_INTEGRITY_CONFIG` env var
/// 2. `./ct_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Site identification (log context only)
    #[serde(default)]
    pub site: SiteInfo,

    /// Fatigue accumulation constants
    #[serde(default)]
    pub fatigue: FatigueConfig,

    /// Force profile constants
    #[serde(default)]
    pub forces: ForceConfig,

    /// Hydraulic profile constants
    #[serde(default)]
    pub hydraulics: HydraulicConfig,

    /// Job simulation timing, feasibility and prediction constants
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Risk identification thresholds
    #[serde(default)]
    pub risk: RiskThresholds,

    /// Reel state / fatigue log storage
    #[serde(default)]
    pub storage: StorageConfig,
}

impl EngineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$CT_INTEGRITY_CONFIG` environment variable
    /// 2. `./ct_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), site = %config.site.name, "Loaded engine config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(site = %config.site.name, "Loaded engine config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        for w in &super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML string (no file involved).
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in &super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all constants for internal consistency.
    ///
    /// Rules:
    /// - Critical fatigue status must sit above the high status
    /// - Divisors and step counts must be positive
    /// - Utilization ratios must be in (0, 1]
    /// - Everything must be finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let f = &self.fatigue;
        Self::check_escalation(
            f.high_status_percent,
            f.critical_status_percent,
            "fatigue.status_percent",
            &mut errors,
        );
        if f.critical_status_percent > 100.0 {
            errors.push(format!(
                "fatigue.critical_status_percent ({:.1}) cannot exceed 100",
                f.critical_status_percent
            ));
        }
        if f.min_cycles_to_failure < 1.0 {
            errors.push("fatigue.min_cycles_to_failure must be >= 1".to_string());
        }
        if f.max_cycles_to_failure <= f.min_cycles_to_failure {
            errors.push(format!(
                "fatigue.max_cycles_to_failure ({:e}) must be > min_cycles_to_failure ({:e})",
                f.max_cycles_to_failure, f.min_cycles_to_failure
            ));
        }
        if f.temperature_sensitivity_f <= 0.0 {
            errors.push("fatigue.temperature_sensitivity_f must be > 0 (used as divisor)".to_string());
        }
        if f.min_damage_per_cycle_percent <= 0.0 {
            errors.push("fatigue.min_damage_per_cycle_percent must be > 0 (used as divisor)".to_string());
        }

        let s = &self.simulation;
        if s.discretization_steps == 0 {
            errors.push("simulation.discretization_steps must be > 0".to_string());
        }

        let r = &self.risk;
        for (name, value) in [
            ("risk.tension_utilization", r.tension_utilization),
            ("risk.pressure_utilization", r.pressure_utilization),
        ] {
            if value <= 0.0 || value > 1.0 {
                errors.push(format!("{name} = {value:.3} must be in (0, 1]"));
            }
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        // NaN/Inf comparisons silently pass the checks above
        if let Ok(value) = toml::Value::try_from(self) {
            for key in non_finite_keys(&value, "") {
                errors.push(format!("{key} must be a finite number"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_escalation(lower: f64, upper: f64, name: &str, errors: &mut Vec<String>) {
        if !lower.is_finite() || !upper.is_finite() {
            errors.push(format!(
                "{name}: values must be finite (got high={lower}, critical={upper})"
            ));
            return;
        }
        if upper < lower {
            errors.push(format!(
                "{name}: critical ({upper:.3}) must be >= high ({lower:.3})"
            ));
        }
    }
}

fn non_finite_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let Some(table) = value.as_table() else {
        return Vec::new();
    };
    let mut keys = Vec::new();
    for (k, v) in table {
        let path = if prefix.is_empty() { k.clone() } else { format!("{prefix}.{k}") };
        match v {
            toml::Value::Float(f) if !f.is_finite() => keys.push(path),
            toml::Value::Table(_) => keys.extend(non_finite_keys(v, &path)),
            _ => {}
        }
    }
    keys
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Site Info
// ============================================================================

/// Identification metadata. Not used for logic, only log context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    #[serde(default = "default_site_name")]
    pub name: String,

    #[serde(default)]
    pub operator: String,
}

fn default_site_name() -> String {
    "DEFAULT".to_string()
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            operator: String::new(),
        }
    }
}

// ============================================================================
// Fatigue Accumulation
// ============================================================================

/// Palmgren-Miner accumulation constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FatigueConfig {
    /// Combined stress below this is not considered a damaging cycle (psi).
    #[serde(default = "default_stress_threshold")]
    pub stress_threshold_psi: f64,

    /// Lower clamp on S-N cycles to failure.
    #[serde(default = "default_min_ctf")]
    pub min_cycles_to_failure: f64,

    /// Upper clamp on S-N cycles to failure.
    #[serde(default = "default_max_ctf")]
    pub max_cycles_to_failure: f64,

    /// Temperature at which the temperature factor is exactly 1.0 (°F).
    #[serde(default = "default_reference_temperature")]
    pub reference_temperature_f: f64,

    /// Degrees per unit of temperature factor: `1 + (T - ref) / sensitivity`.
    #[serde(default = "default_temperature_sensitivity")]
    pub temperature_sensitivity_f: f64,

    /// Accumulated fatigue at or above this is reported HIGH (%).
    #[serde(default = "default_high_status")]
    pub high_status_percent: f64,

    /// Accumulated fatigue at or above this is reported CRITICAL (%).
    #[serde(default = "default_critical_status")]
    pub critical_status_percent: f64,

    /// Floor on average damage per cycle for the remaining-cycles extrapolation (%).
    #[serde(default = "default_min_damage_per_cycle")]
    pub min_damage_per_cycle_percent: f64,

    /// Material grade used when a reel's grade is not in the catalog.
    #[serde(default = "default_material_grade")]
    pub default_material_grade: String,
}

fn default_stress_threshold() -> f64 { 1_000.0 }
fn default_min_ctf() -> f64 { 1.0 }
fn default_max_ctf() -> f64 { 1e9 }
fn default_reference_temperature() -> f64 { 70.0 }
fn default_temperature_sensitivity() -> f64 { 1_000.0 }
fn default_high_status() -> f64 { 80.0 }
fn default_critical_status() -> f64 { 95.0 }
fn default_min_damage_per_cycle() -> f64 { 0.001 }
fn default_material_grade() -> String { defaults::DEFAULT_MATERIAL_GRADE.to_string() }

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            stress_threshold_psi: default_stress_threshold(),
            min_cycles_to_failure: default_min_ctf(),
            max_cycles_to_failure: default_max_ctf(),
            reference_temperature_f: default_reference_temperature(),
            temperature_sensitivity_f: default_temperature_sensitivity(),
            high_status_percent: default_high_status(),
            critical_status_percent: default_critical_status(),
            min_damage_per_cycle_percent: default_min_damage_per_cycle(),
            default_material_grade: default_material_grade(),
        }
    }
}

// ============================================================================
// Force Profile
// ============================================================================

/// Tubing weight, friction and buckling constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceConfig {
    /// Steel density (lb/ft³). Linear weight = area(in²) × density / 144.
    #[serde(default = "default_steel_density")]
    pub steel_density_lb_ft3: f64,

    /// Coulomb friction coefficient between tubing and wellbore.
    #[serde(default = "default_friction_coefficient")]
    pub friction_coefficient: f64,

    /// Young's modulus used in the Euler buckling load (psi).
    #[serde(default = "default_youngs_modulus")]
    pub youngs_modulus_psi: f64,
}

fn default_steel_density() -> f64 { 490.0 }
fn default_friction_coefficient() -> f64 { 0.25 }
fn default_youngs_modulus() -> f64 { 30e6 }

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            steel_density_lb_ft3: default_steel_density(),
            friction_coefficient: default_friction_coefficient(),
            youngs_modulus_psi: default_youngs_modulus(),
        }
    }
}

// ============================================================================
// Hydraulic Profile
// ============================================================================

/// Pumping and pressure-loss constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydraulicConfig {
    /// Darcy-Weisbach friction factor (dimensionless).
    #[serde(default = "default_darcy_friction")]
    pub darcy_friction_factor: f64,

    /// Pump rate conversion, bbl/min → ft³/s.
    #[serde(default = "default_bpm_to_cfs")]
    pub bpm_to_ft3_per_sec: f64,

    /// Gravitational acceleration (ft/s²).
    #[serde(default = "default_gravity")]
    pub gravity_ft_s2: f64,

    /// Hydrostatic gradient factor, psi/ft per ppg.
    #[serde(default = "default_hydrostatic_factor")]
    pub hydrostatic_gradient_factor: f64,

    /// Multiplier applied to fluid density in the friction-pressure term.
    #[serde(default = "default_fluid_weight_factor")]
    pub fluid_weight_factor: f64,
}

fn default_darcy_friction() -> f64 { 0.02 }
fn default_bpm_to_cfs() -> f64 { 0.0238 }
fn default_gravity() -> f64 { 32.174 }
fn default_hydrostatic_factor() -> f64 { 0.052 }
fn default_fluid_weight_factor() -> f64 { 8.33 }

impl Default for HydraulicConfig {
    fn default() -> Self {
        Self {
            darcy_friction_factor: default_darcy_friction(),
            bpm_to_ft3_per_sec: default_bpm_to_cfs(),
            gravity_ft_s2: default_gravity(),
            hydrostatic_gradient_factor: default_hydrostatic_factor(),
            fluid_weight_factor: default_fluid_weight_factor(),
        }
    }
}

// ============================================================================
// Job Simulation
// ============================================================================

/// Discretization, timing, feasibility warnings and the placeholder fatigue prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of depth intervals; profiles carry `steps + 1` points.
    #[serde(default = "default_steps")]
    pub discretization_steps: usize,

    #[serde(default = "default_rig_up")]
    pub rig_up_hours: f64,

    #[serde(default = "default_rig_down")]
    pub rig_down_hours: f64,

    /// On-depth time when the plan does not give a treatment duration.
    #[serde(default = "default_on_depth")]
    pub default_on_depth_hours: f64,

    /// Pull-out time as a fraction of run-in time.
    #[serde(default = "default_pull_out_ratio")]
    pub pull_out_ratio: f64,

    /// Target depth beyond which a deep-well warning is raised (ft).
    #[serde(default = "default_deep_well")]
    pub deep_well_warning_ft: f64,

    /// Inclination beyond which a high-deviation warning is raised (deg).
    #[serde(default = "default_high_inclination")]
    pub high_inclination_warning_deg: f64,

    /// Damage cycles assumed per job (run-in + pull-out).
    #[serde(default = "default_cycles_per_job")]
    pub fatigue_cycles_per_job: u32,

    /// Placeholder damage per assumed cycle.
    #[serde(default = "default_damage_per_cycle")]
    pub fatigue_damage_per_cycle: f64,
}

fn default_steps() -> usize { 100 }
fn default_rig_up() -> f64 { 2.0 }
fn default_rig_down() -> f64 { 1.5 }
fn default_on_depth() -> f64 { 1.0 }
fn default_pull_out_ratio() -> f64 { 0.7 }
fn default_deep_well() -> f64 { 20_000.0 }
fn default_high_inclination() -> f64 { 60.0 }
fn default_cycles_per_job() -> u32 { 2 }
fn default_damage_per_cycle() -> f64 { 0.01 }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            discretization_steps: default_steps(),
            rig_up_hours: default_rig_up(),
            rig_down_hours: default_rig_down(),
            default_on_depth_hours: default_on_depth(),
            pull_out_ratio: default_pull_out_ratio(),
            deep_well_warning_ft: default_deep_well(),
            high_inclination_warning_deg: default_high_inclination(),
            fatigue_cycles_per_job: default_cycles_per_job(),
            fatigue_damage_per_cycle: default_damage_per_cycle(),
        }
    }
}

// ============================================================================
// Risk Thresholds
// ============================================================================

/// Thresholds for the simulator's risk rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Max hookload above this fraction of unit tension capacity → TENSION_LIMIT.
    #[serde(default = "default_tension_utilization")]
    pub tension_utilization: f64,

    /// Any buckling margin below this (%) → BUCKLING.
    #[serde(default = "default_buckling_margin")]
    pub buckling_margin_percent: f64,

    /// Max hydraulic pressure above this fraction of unit pressure capacity → PRESSURE_LIMIT.
    #[serde(default = "default_pressure_utilization")]
    pub pressure_utilization: f64,

    /// Inclination above this (deg) combined with depth → STUCK_PIPE.
    #[serde(default = "default_stuck_inclination")]
    pub stuck_pipe_inclination_deg: f64,

    /// Depth above this (ft) combined with inclination → STUCK_PIPE.
    #[serde(default = "default_stuck_depth")]
    pub stuck_pipe_depth_ft: f64,
}

fn default_tension_utilization() -> f64 { 0.9 }
fn default_buckling_margin() -> f64 { 20.0 }
fn default_pressure_utilization() -> f64 { 0.9 }
fn default_stuck_inclination() -> f64 { 45.0 }
fn default_stuck_depth() -> f64 { 15_000.0 }

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            tension_utilization: default_tension_utilization(),
            buckling_margin_percent: default_buckling_margin(),
            pressure_utilization: default_pressure_utilization(),
            stuck_pipe_inclination_deg: default_stuck_inclination(),
            stuck_pipe_depth_ft: default_stuck_depth(),
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled database directory.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    defaults::DEFAULT_STORAGE_PATH.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
[forces]
friction_coefficient = 0.3
"#,
        )
        .expect("partial config should parse");
        assert!((config.forces.friction_coefficient - 0.3).abs() < 1e-12);
        assert!((config.forces.steel_density_lb_ft3 - 490.0).abs() < 1e-12);
        assert_eq!(config.simulation.discretization_steps, 100);
    }

    #[test]
    fn test_inverted_status_thresholds_rejected() {
        let mut config = EngineConfig::default();
        config.fatigue.high_status_percent = 96.0;
        config.fatigue.critical_status_percent = 90.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("fatigue.status_percent"), "{err}");
    }

    #[test]
    fn test_zero_steps_rejected() {
        let mut config = EngineConfig::default();
        config.simulation.discretization_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_utilization_out_of_range_rejected() {
        let mut config = EngineConfig::default();
        config.risk.tension_utilization = 1.5;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("risk.tension_utilization"), "{err}");
    }

    #[test]
    fn test_round_trip_toml() {
        let config = EngineConfig::default();
        let toml_str = config.to_toml().expect("serialize");
        let parsed = EngineConfig::from_toml_str(&toml_str).expect("reparse");
        assert_eq!(parsed.fatigue.default_material_grade, "QT-800");
        assert_eq!(parsed.simulation.fatigue_cycles_per_job, 2);
    }
}
