//! Tubing material catalog
//!
//! S-N curve constants per QT grade and corrosion multipliers per service
//! environment. Built once on first use and read without locking afterwards.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::defaults::DEFAULT_MATERIAL_GRADE;

/// Mechanical and fatigue constants for one tubing grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialProperties {
    pub grade: &'static str,
    /// Young's modulus (psi)
    pub youngs_modulus_psi: f64,
    /// S-N constant `A` in `N = A·σ^(-m)`
    pub sn_constant: f64,
    /// S-N exponent `m`
    pub sn_exponent: f64,
    pub yield_strength_psi: f64,
}

const GRADES: [MaterialProperties; 3] = [
    MaterialProperties {
        grade: "QT-800",
        youngs_modulus_psi: 30e6,
        sn_constant: 1e15,
        sn_exponent: 3.5,
        yield_strength_psi: 80_000.0,
    },
    MaterialProperties {
        grade: "QT-900",
        youngs_modulus_psi: 30e6,
        sn_constant: 8e14,
        sn_exponent: 3.3,
        yield_strength_psi: 90_000.0,
    },
    MaterialProperties {
        grade: "QT-1000",
        youngs_modulus_psi: 30e6,
        sn_constant: 5e14,
        sn_exponent: 3.0,
        yield_strength_psi: 100_000.0,
    },
];

const CORROSION_FACTORS: [(&str, f64); 4] = [
    ("SWEET", 1.0),
    ("MILDLY_SOUR", 1.2),
    ("SOUR", 1.5),
    ("HIGHLY_CORROSIVE", 2.0),
];

static CATALOG: OnceLock<HashMap<&'static str, MaterialProperties>> = OnceLock::new();

fn catalog() -> &'static HashMap<&'static str, MaterialProperties> {
    CATALOG.get_or_init(|| GRADES.iter().map(|m| (m.grade, *m)).collect())
}

/// Exact catalog entry for `grade`, if known.
pub fn find(grade: &str) -> Option<MaterialProperties> {
    catalog().get(grade).copied()
}

/// Properties for `grade`, falling back to QT-800 for anything unknown.
pub fn lookup(grade: &str) -> MaterialProperties {
    lookup_or(grade, DEFAULT_MATERIAL_GRADE)
}

/// Properties for `grade`, then `fallback`, then QT-800.
pub fn lookup_or(grade: &str, fallback: &str) -> MaterialProperties {
    find(grade)
        .or_else(|| find(fallback))
        .unwrap_or(GRADES[0])
}

/// Damage multiplier for a service environment tag. Unknown or absent is 1.0.
pub fn corrosion_factor(environment: Option<&str>) -> f64 {
    environment
        .and_then(|env| {
            CORROSION_FACTORS
                .iter()
                .find(|(tag, _)| *tag == env)
                .map(|(_, factor)| *factor)
        })
        .unwrap_or(1.0)
}

/// Catalog grades, sorted for stable diagnostics output.
pub fn known_grades() -> Vec<&'static str> {
    let mut grades: Vec<_> = catalog().keys().copied().collect();
    grades.sort_unstable();
    grades
}
