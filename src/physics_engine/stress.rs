//! Tubing geometry and stress model
//!
//! Thin-wall hoop stress, uniform axial stress and pure bending over a fixed
//! radius, combined with the von Mises criterion. No clamping is applied here:
//! a degenerate geometry yields inf/NaN and the caller decides what to do.

use std::f64::consts::PI;

use crate::types::StressState;

/// Cross-section of a tubing string (in).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubingGeometry {
    pub od_in: f64,
    pub id_in: f64,
}

impl TubingGeometry {
    pub fn new(od_in: f64, id_in: f64) -> Self {
        Self { od_in, id_in }
    }

    pub fn wall_thickness_in(&self) -> f64 {
        (self.od_in - self.id_in) / 2.0
    }

    /// Steel cross-section (in²).
    pub fn steel_area_in2(&self) -> f64 {
        PI / 4.0 * (self.od_in.powi(2) - self.id_in.powi(2))
    }

    /// Second moment of area (in⁴).
    pub fn moment_of_inertia_in4(&self) -> f64 {
        PI / 64.0 * (self.od_in.powi(4) - self.id_in.powi(4))
    }

    /// Bore flow area (ft²).
    pub fn bore_area_ft2(&self) -> f64 {
        PI / 4.0 * (self.id_in / 12.0).powi(2)
    }
}

/// Stresses for internal pressure `pressure_psi`, axial load `tension_lbf`
/// and curvature radius `radius_in`.
///
/// - hoop: `p·ID / 2t`
/// - axial: `T / A`
/// - bending: `E·(OD/2) / R`
/// - von Mises: `sqrt(h² + a² + b² − h·a − h·b − a·b)`
pub fn compute_stresses(
    geometry: &TubingGeometry,
    pressure_psi: f64,
    tension_lbf: f64,
    radius_in: f64,
    youngs_modulus_psi: f64,
) -> StressState {
    let hoop = pressure_psi * geometry.id_in / (2.0 * geometry.wall_thickness_in());
    let axial = tension_lbf / geometry.steel_area_in2();
    let bending = youngs_modulus_psi * (geometry.od_in / 2.0) / radius_in;

    StressState {
        hoop_psi: hoop,
        axial_psi: axial,
        bending_psi: bending,
        von_mises_psi: von_mises(hoop, axial, bending),
    }
}

pub fn von_mises(hoop: f64, axial: f64, bending: f64) -> f64 {
    (hoop * hoop + axial * axial + bending * bending
        - hoop * axial
        - hoop * bending
        - axial * bending)
        .sqrt()
}
