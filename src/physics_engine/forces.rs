//! Running-in force profile: tubing weight, Coulomb drag and Euler buckling
//! headroom at evenly spaced depth stations.

use std::f64::consts::PI;

use crate::config::ForceConfig;
use crate::types::{ForcePoint, ForceProfile};

use super::stress::TubingGeometry;

#[derive(Debug, Clone)]
pub struct ForceProfiler {
    config: ForceConfig,
    steps: usize,
}

impl ForceProfiler {
    pub fn new(config: ForceConfig, steps: usize) -> Self {
        Self { config, steps }
    }

    /// Buoyancy-free tubing weight (lbf/ft).
    pub fn linear_weight_lbf_ft(&self, geometry: &TubingGeometry) -> f64 {
        geometry.steel_area_in2() * self.config.steel_density_lb_ft3 / 144.0
    }

    /// Euler critical load `π²EI/L²` for a column of `depth_ft` (lbf).
    ///
    /// Infinite at zero depth.
    pub fn critical_buckling_lbf(&self, geometry: &TubingGeometry, depth_ft: f64) -> f64 {
        let length_in = depth_ft * 12.0;
        PI * PI * self.config.youngs_modulus_psi * geometry.moment_of_inertia_in4()
            / (length_in * length_in)
    }

    /// Profile from surface to `target_depth_ft` at `steps + 1` stations.
    pub fn profile(
        &self,
        geometry: &TubingGeometry,
        target_depth_ft: f64,
        max_inclination_deg: f64,
    ) -> ForceProfile {
        let weight_per_ft = self.linear_weight_lbf_ft(geometry);
        let sin_incl = max_inclination_deg.to_radians().sin();
        let increment = target_depth_ft / self.steps as f64;

        let mut points = Vec::with_capacity(self.steps + 1);
        let mut max_hookload: f64 = 0.0;

        for i in 0..=self.steps {
            let depth_ft = i as f64 * increment;
            let weight = weight_per_ft * depth_ft;
            let normal = weight * sin_incl;
            let friction = self.config.friction_coefficient * normal;
            let hookload = weight + friction;

            let critical = self.critical_buckling_lbf(geometry, depth_ft);
            // A zero-length column cannot buckle
            let margin = if critical.is_infinite() {
                100.0
            } else {
                ((critical - hookload) / critical * 100.0).max(0.0)
            };

            max_hookload = max_hookload.max(hookload);
            points.push(ForcePoint {
                depth_ft,
                hookload_lbf: hookload,
                friction_lbf: friction,
                buckling_margin_percent: margin,
            });
        }

        ForceProfile {
            points,
            max_hookload_lbf: max_hookload,
        }
    }
}

impl Default for ForceProfiler {
    fn default() -> Self {
        Self::new(ForceConfig::default(), 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> TubingGeometry {
        TubingGeometry::new(2.375, 1.995)
    }

    #[test]
    fn test_profile_shape() {
        let profile = ForceProfiler::default().profile(&geometry(), 10_000.0, 30.0);
        assert_eq!(profile.points.len(), 101);
        assert_eq!(profile.points[0].depth_ft, 0.0);
        assert!((profile.points[100].depth_ft - 10_000.0).abs() < 1e-9);
        assert_eq!(profile.points[0].buckling_margin_percent, 100.0);
    }

    #[test]
    fn test_hookload_at_td() {
        let profiler = ForceProfiler::default();
        let w = profiler.linear_weight_lbf_ft(&geometry());
        let profile = profiler.profile(&geometry(), 10_000.0, 30.0);
        // sin(30°) = 0.5, μ = 0.25 → weight × 1.125
        let expected = w * 10_000.0 * 1.125;
        assert!((profile.max_hookload_lbf - expected).abs() < 1e-6);
        assert!((profile.points[100].friction_lbf - w * 10_000.0 * 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_well_has_no_drag() {
        let profile = ForceProfiler::default().profile(&geometry(), 5_000.0, 0.0);
        assert!(profile.points.iter().all(|p| p.friction_lbf == 0.0));
    }

    #[test]
    fn test_margin_never_negative() {
        let profile = ForceProfiler::default().profile(&geometry(), 15_000.0, 45.0);
        assert!(profile
            .points
            .iter()
            .all(|p| (0.0..=100.0).contains(&p.buckling_margin_percent)));
        assert_eq!(profile.min_buckling_margin(), Some(0.0));
    }
}
