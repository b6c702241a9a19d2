//! Config validation: unknown-key warnings with "did you mean" hints, plus
//! physical range checks on the engine constants.
//!
//! The raw TOML is walked as a `toml::Value` before serde sees it, so a typo
//! like `fricton_coefficient` is reported instead of silently falling back
//! to the default.

use std::collections::HashSet;

use super::EngineConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of `EngineConfig`.
///
/// Kept by hand in step with engine_config.rs; a new field needs a line here.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        "site",
        "site.name",
        "site.operator",
        "fatigue",
        "fatigue.stress_threshold_psi",
        "fatigue.min_cycles_to_failure",
        "fatigue.max_cycles_to_failure",
        "fatigue.reference_temperature_f",
        "fatigue.temperature_sensitivity_f",
        "fatigue.high_status_percent",
        "fatigue.critical_status_percent",
        "fatigue.min_damage_per_cycle_percent",
        "fatigue.default_material_grade",
        "forces",
        "forces.steel_density_lb_ft3",
        "forces.friction_coefficient",
        "forces.youngs_modulus_psi",
        "hydraulics",
        "hydraulics.darcy_friction_factor",
        "hydraulics.bpm_to_ft3_per_sec",
        "hydraulics.gravity_ft_s2",
        "hydraulics.hydrostatic_gradient_factor",
        "hydraulics.fluid_weight_factor",
        "simulation",
        "simulation.discretization_steps",
        "simulation.rig_up_hours",
        "simulation.rig_down_hours",
        "simulation.default_on_depth_hours",
        "simulation.pull_out_ratio",
        "simulation.deep_well_warning_ft",
        "simulation.high_inclination_warning_deg",
        "simulation.fatigue_cycles_per_job",
        "simulation.fatigue_damage_per_cycle",
        "risk",
        "risk.tension_utilization",
        "risk.buckling_margin_percent",
        "risk.pressure_utilization",
        "risk.stuck_pipe_inclination_deg",
        "risk.stuck_pipe_depth_ft",
        "storage",
        "storage.path",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Collect the dotted path of every key in a TOML tree, tables included.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let Some(table) = value.as_table() else {
        return Vec::new();
    };
    let mut keys = Vec::with_capacity(table.len());
    for (k, v) in table {
        let path = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        if v.is_table() {
            keys.push(path.clone());
            keys.extend(walk_toml_keys(v, &path));
        } else {
            keys.push(path);
        }
    }
    keys
}

// ============================================================================
// Suggestions
// ============================================================================

/// Edit distance between two keys (insert, delete, substitute all cost 1).
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let substitute = diag + usize::from(ca != cb);
            row[j + 1] = substitute.min(above + 1).min(row[j] + 1);
            diag = above;
        }
    }
    row[b.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.to_string())
}

/// Warnings for keys `EngineConfig` does not know about. Never fails.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    // Syntax errors surface later from serde with a proper location.
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Range checks on a parsed config.
///
/// Returns (errors, warnings): errors are values no tubing string can have,
/// warnings are unusual but plausible.
pub fn validate_physical_ranges(config: &EngineConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let f = &config.forces;
    if f.steel_density_lb_ft3 <= 0.0 {
        errors.push(format!(
            "forces.steel_density_lb_ft3 = {:.1} must be > 0",
            f.steel_density_lb_ft3
        ));
    } else if !(400.0..=560.0).contains(&f.steel_density_lb_ft3) {
        warnings.push(ValidationWarning {
            field: "forces.steel_density_lb_ft3".to_string(),
            message: format!(
                "steel_density_lb_ft3 = {:.1} is outside typical range for steel (400-560)",
                f.steel_density_lb_ft3
            ),
            suggestion: None,
        });
    }
    if f.friction_coefficient < 0.0 {
        errors.push(format!(
            "forces.friction_coefficient = {:.3} cannot be negative",
            f.friction_coefficient
        ));
    } else if f.friction_coefficient > 1.0 {
        warnings.push(ValidationWarning {
            field: "forces.friction_coefficient".to_string(),
            message: format!(
                "friction_coefficient = {:.3} is above 1.0, unusual for cased or open hole",
                f.friction_coefficient
            ),
            suggestion: None,
        });
    }
    if f.youngs_modulus_psi <= 0.0 {
        errors.push(format!(
            "forces.youngs_modulus_psi = {:e} must be > 0",
            f.youngs_modulus_psi
        ));
    }

    let h = &config.hydraulics;
    if h.darcy_friction_factor < 0.0 {
        errors.push(format!(
            "hydraulics.darcy_friction_factor = {:.4} cannot be negative",
            h.darcy_friction_factor
        ));
    }
    if h.gravity_ft_s2 <= 0.0 {
        errors.push(format!(
            "hydraulics.gravity_ft_s2 = {:.3} must be > 0 (used as divisor)",
            h.gravity_ft_s2
        ));
    }

    let s = &config.simulation;
    for (name, value) in [
        ("simulation.rig_up_hours", s.rig_up_hours),
        ("simulation.rig_down_hours", s.rig_down_hours),
        ("simulation.default_on_depth_hours", s.default_on_depth_hours),
        ("simulation.pull_out_ratio", s.pull_out_ratio),
    ] {
        if value < 0.0 {
            errors.push(format!("{name} = {value:.2} cannot be negative"));
        }
    }
    if s.discretization_steps > 10_000 {
        warnings.push(ValidationWarning {
            field: "simulation.discretization_steps".to_string(),
            message: format!(
                "discretization_steps = {} produces very large profiles",
                s.discretization_steps
            ),
            suggestion: None,
        });
    }

    if config.fatigue.stress_threshold_psi < 0.0 {
        errors.push(format!(
            "fatigue.stress_threshold_psi = {:.1} cannot be negative",
            config.fatigue.stress_threshold_psi
        ));
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("gooseneck", "gooseneck"), 0);
        assert_eq!(levenshtein("fricton", "friction"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_nested_tables() {
        let value: toml::Value = r#"
            [forces]
            friction_coefficient = 0.3
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&value, "");
        assert!(keys.contains(&"forces".to_string()));
        assert!(keys.contains(&"forces.friction_coefficient".to_string()));
    }

    #[test]
    fn test_typo_suggests_known_key() {
        let warnings = validate_unknown_keys(
            r#"
[forces]
fricton_coefficient = 0.3
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("forces.friction_coefficient")
        );
        assert!(warnings[0].to_string().contains("did you mean"));
    }

    #[test]
    fn test_valid_keys_clean() {
        let warnings = validate_unknown_keys(
            r#"
[site]
name = "Pad 7"

[risk]
stuck_pipe_depth_ft = 14000.0

[storage]
path = "/var/lib/ct"
"#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_garbage_key_has_no_suggestion() {
        let known = known_config_keys();
        assert!(suggest_correction("zzzzzzzzzzzzzzzzzzzzzzzz", &known).is_none());
    }

    #[test]
    fn test_defaults_in_range() {
        let (errors, warnings) = validate_physical_ranges(&EngineConfig::default());
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_negative_friction_is_error() {
        let mut config = EngineConfig::default();
        config.forces.friction_coefficient = -0.1;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("friction_coefficient")));
    }

    #[test]
    fn test_light_steel_is_warning() {
        let mut config = EngineConfig::default();
        config.forces.steel_density_lb_ft3 = 300.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "forces.steel_density_lb_ft3"));
    }
}
