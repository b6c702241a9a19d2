//! Pumping pressure profile: hydrostatic head plus Darcy-Weisbach friction
//! inside the tubing bore.

use crate::config::HydraulicConfig;
use crate::types::{HydraulicPoint, HydraulicProfile};

use super::stress::TubingGeometry;

#[derive(Debug, Clone)]
pub struct HydraulicProfiler {
    config: HydraulicConfig,
    steps: usize,
}

impl HydraulicProfiler {
    pub fn new(config: HydraulicConfig, steps: usize) -> Self {
        Self { config, steps }
    }

    /// Mean bore velocity for a pump rate (ft/s).
    pub fn velocity_ft_s(&self, geometry: &TubingGeometry, pump_rate_bpm: f64) -> f64 {
        pump_rate_bpm * self.config.bpm_to_ft3_per_sec / geometry.bore_area_ft2()
    }

    /// `None` when nothing is pumped.
    pub fn profile(
        &self,
        geometry: &TubingGeometry,
        target_depth_ft: f64,
        fluid_density_ppg: f64,
        pump_rate_bpm: Option<f64>,
    ) -> Option<HydraulicProfile> {
        let rate = pump_rate_bpm.filter(|r| *r != 0.0)?;

        let velocity = self.velocity_ft_s(geometry, rate);
        let bore_ft = geometry.id_in / 12.0;
        let increment = target_depth_ft / self.steps as f64;

        let mut points = Vec::with_capacity(self.steps + 1);
        let mut max_pressure: f64 = 0.0;

        for i in 0..=self.steps {
            let depth_ft = i as f64 * increment;
            let hydrostatic = fluid_density_ppg * self.config.hydrostatic_gradient_factor * depth_ft;
            let friction = self.config.darcy_friction_factor
                * (depth_ft / bore_ft)
                * (fluid_density_ppg * self.config.fluid_weight_factor * velocity.powi(2))
                / (2.0 * self.config.gravity_ft_s2);
            let total = hydrostatic + friction;

            max_pressure = max_pressure.max(total);
            points.push(HydraulicPoint {
                depth_ft,
                pressure_psi: total,
                friction_pressure_psi: friction,
                velocity_ft_s: velocity,
            });
        }

        Some(HydraulicProfile {
            points,
            max_pressure_psi: max_pressure,
        })
    }
}

impl Default for HydraulicProfiler {
    fn default() -> Self {
        Self::new(HydraulicConfig::default(), 100)
    }
}
