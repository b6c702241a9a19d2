//! Config Validation Tests
//!
//! Typo detection on raw TOML, physical range checks, and file loading
//! through `EngineConfig::load_from_file`.

use std::io::Write;

use ct_integrity::config::validation::{
    known_config_keys, suggest_correction, validate_physical_ranges, validate_unknown_keys,
};
use ct_integrity::config::{self, ConfigError, EngineConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_forces_section_warns_with_suggestion() {
    let toml_str = r#"
[forces]
fricton_coefficient = 0.3
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(warnings[0].field, "forces.fricton_coefficient");
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("forces.friction_coefficient")
    );
    assert!(warnings[0].to_string().contains("did you mean"));
}

#[test]
fn unknown_section_far_from_anything_has_no_suggestion() {
    let warnings = validate_unknown_keys("[telemetry_uplink]\nendpoint = \"x\"\n");
    assert!(!warnings.is_empty());
    assert!(warnings.iter().all(|w| w.suggestion.is_none()));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[site]
name = "Base-North"
operator = "Acme Well Services"

[fatigue]
stress_threshold_psi = 1500.0
high_status_percent = 75.0

[simulation]
discretization_steps = 50

[storage]
path = "/var/lib/ct/reels.sled"
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());
}

#[test]
fn every_serialized_default_key_is_known() {
    let raw = EngineConfig::default().to_toml().unwrap();
    let warnings = validate_unknown_keys(&raw);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}

#[test]
fn suggestion_distance_is_bounded() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("risk.tension_utilisation", &known).as_deref(),
        Some("risk.tension_utilization")
    );
    assert!(suggest_correction("completely.unrelated.key", &known).is_none());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn default_config_passes_range_checks() {
    let (errors, warnings) = validate_physical_ranges(&EngineConfig::default());
    assert!(errors.is_empty());
    assert!(warnings.is_empty());
}

#[test]
fn negative_friction_is_an_error() {
    let mut config = EngineConfig::default();
    config.forces.friction_coefficient = -0.1;
    let (errors, _) = validate_physical_ranges(&config);
    assert!(errors.iter().any(|e| e.contains("friction_coefficient")));
    assert!(config.validate().is_err());
}

#[test]
fn inverted_status_bands_rejected() {
    let result = EngineConfig::from_toml_str(
        r#"
[fatigue]
high_status_percent = 96.0
critical_status_percent = 90.0
"#,
    );
    match result {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("fatigue.status_percent")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn non_finite_constant_rejected() {
    let mut config = EngineConfig::default();
    config.hydraulics.darcy_friction_factor = f64::NAN;
    match config.validate() {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors
                .iter()
                .any(|e| e.contains("hydraulics.darcy_friction_factor")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn zero_steps_rejected() {
    let mut config = EngineConfig::default();
    config.simulation.discretization_steps = 0;
    assert!(config.validate().is_err());
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_applies_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[site]
name = "Test-Yard"

[forces]
friction_coefficient = 0.35

[risk]
stuck_pipe_depth_ft = 12000.0
"#
    )
    .unwrap();

    let config = EngineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.site.name, "Test-Yard");
    assert!((config.forces.friction_coefficient - 0.35).abs() < 1e-12);
    assert!((config.risk.stuck_pipe_depth_ft - 12_000.0).abs() < 1e-12);
    // Untouched sections keep defaults
    assert_eq!(config.simulation.discretization_steps, 100);
    assert!((config.fatigue.stress_threshold_psi - 1_000.0).abs() < 1e-12);
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::load_from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(..))));
}

#[test]
fn malformed_toml_is_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[forces\nfriction_coefficient = ").unwrap();
    assert!(matches!(
        EngineConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(..))
    ));
}

#[test]
fn toml_round_trip_preserves_values() {
    let mut config = EngineConfig::default();
    config.site.name = "Round-Trip".to_string();
    config.fatigue.high_status_percent = 70.0;
    let back = EngineConfig::from_toml_str(&config.to_toml().unwrap()).unwrap();
    assert_eq!(back.site.name, "Round-Trip");
    assert!((back.fatigue.high_status_percent - 70.0).abs() < 1e-12);
}

#[test]
fn global_get_falls_back_to_defaults() {
    let cfg = config::get();
    assert!(config::is_initialized());
    assert!(cfg.validate().is_ok());
}
