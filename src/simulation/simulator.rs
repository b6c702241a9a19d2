//! Job feasibility and mechanical/hydraulic simulation

use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::config::{EngineConfig, RiskThresholds, SimulationConfig};
use crate::physics_engine::{ForceProfiler, HydraulicProfiler, TubingGeometry};
use crate::types::{
    FatiguePrediction, Feasibility, ForceProfile, JobPlan, SimulationResult, TimeEstimate,
};

use super::risks::identify_risks;
use super::SimulationError;

/// Runs a plan through feasibility, force, hydraulic, time, fatigue and risk
/// stages. Holds only configuration, so one instance can serve any number
/// of threads.
#[derive(Debug, Clone)]
pub struct JobSimulator {
    forces: ForceProfiler,
    hydraulics: HydraulicProfiler,
    settings: SimulationConfig,
    risk: RiskThresholds,
}

impl JobSimulator {
    pub fn new(config: &EngineConfig) -> Self {
        let steps = config.simulation.discretization_steps;
        Self {
            forces: ForceProfiler::new(config.forces.clone(), steps),
            hydraulics: HydraulicProfiler::new(config.hydraulics.clone(), steps),
            settings: config.simulation.clone(),
            risk: config.risk.clone(),
        }
    }

    pub fn check_feasibility(&self, plan: &JobPlan) -> Feasibility {
        let mut limiting_factors = Vec::new();
        let mut warnings = Vec::new();

        if plan.target_depth_ft > plan.tubing_length_ft {
            limiting_factors.push("Target depth exceeds tubing length".to_string());
        }
        if plan.max_pressure_psi > plan.unit_max_pressure_psi {
            limiting_factors.push("Required pressure exceeds unit capacity".to_string());
        }
        if plan.tubing_od_in >= plan.wellbore_diameter_in {
            limiting_factors.push("Tubing OD too large for wellbore".to_string());
        }

        if plan.target_depth_ft > self.settings.deep_well_warning_ft {
            warnings.push("Deep well - expect high friction forces".to_string());
        }
        if plan.max_inclination_deg > self.settings.high_inclination_warning_deg {
            warnings.push("High deviation - risk of buckling".to_string());
        }

        Feasibility {
            feasible: limiting_factors.is_empty(),
            limiting_factors,
            warnings,
        }
    }

    pub fn estimate_times(&self, plan: &JobPlan) -> TimeEstimate {
        let s = &self.settings;
        let run_in = plan.target_depth_ft / (plan.max_running_speed_ft_min * 60.0);
        let on_depth = plan.treatment_hours.unwrap_or(s.default_on_depth_hours);
        let pull_out = run_in * s.pull_out_ratio;

        TimeEstimate {
            rig_up_hours: s.rig_up_hours,
            run_in_hours: run_in,
            on_depth_hours: on_depth,
            pull_out_hours: pull_out,
            rig_down_hours: s.rig_down_hours,
            total_hours: s.rig_up_hours + run_in + on_depth + pull_out + s.rig_down_hours,
        }
    }

    /// Flat per-job estimate, independent of the Palmgren-Miner accumulator.
    pub fn predict_fatigue(&self, plan: &JobPlan, forces: &ForceProfile) -> FatiguePrediction {
        let area = TubingGeometry::new(plan.tubing_od_in, plan.tubing_id_in).steel_area_in2();
        let cycles = self.settings.fatigue_cycles_per_job;
        FatiguePrediction {
            cycles,
            estimated_fatigue_percent: self.settings.fatigue_damage_per_cycle * f64::from(cycles),
            average_stress_psi: forces.max_hookload_lbf / area,
        }
    }

    /// Simulate a plan. An infeasible plan is a successful result carrying
    /// only the feasibility verdict.
    pub fn simulate(&self, plan: &JobPlan) -> Result<SimulationResult, SimulationError> {
        let well = plan.well_name.as_deref().unwrap_or("<unnamed>");
        info!(well = %well, "Starting job simulation for well: {}", well);

        plan.validate().inspect_err(|e| {
            error!(well = %well, error = %e, "Error simulating job");
        })?;

        let feasibility = self.check_feasibility(plan);
        let mut result = SimulationResult {
            job_id: plan.job_id,
            well_name: plan.well_name.clone(),
            feasibility,
            ..SimulationResult::default()
        };

        if !result.feasibility.feasible {
            warn!(
                well = %well,
                factors = ?result.feasibility.limiting_factors,
                "Job not feasible: {:?}",
                result.feasibility.limiting_factors
            );
            return Ok(result);
        }

        let geometry = TubingGeometry::new(plan.tubing_od_in, plan.tubing_id_in);
        let forces = self
            .forces
            .profile(&geometry, plan.target_depth_ft, plan.max_inclination_deg);
        let hydraulics = self.hydraulics.profile(
            &geometry,
            plan.target_depth_ft,
            plan.fluid_density_ppg,
            plan.pump_rate_bpm,
        );
        let times = self.estimate_times(plan);
        let fatigue = self.predict_fatigue(plan, &forces);

        let checks = [
            ("max_hookload_lbf", forces.max_hookload_lbf),
            (
                "max_pressure_psi",
                hydraulics.as_ref().map_or(0.0, |h| h.max_pressure_psi),
            ),
            ("total_hours", times.total_hours),
            ("average_stress_psi", fatigue.average_stress_psi),
        ];
        if let Some(&(field, _)) = checks.iter().find(|(_, v)| !v.is_finite()) {
            let err = SimulationError::NonFinite {
                well: well.to_string(),
                field,
            };
            error!(well = %well, error = %err, "Error simulating job");
            return Err(err);
        }

        result.risks = identify_risks(plan, &forces, hydraulics.as_ref(), &self.risk);

        info!(
            well = %well,
            risks = result.risks.len(),
            "Simulation completed. Feasible: {}, Max hookload: {} lbf, Duration: {} hrs",
            result.feasibility.feasible,
            forces.max_hookload_lbf,
            times.total_hours
        );

        result.forces = Some(forces);
        result.hydraulics = hydraulics;
        result.times = Some(times);
        result.fatigue = Some(fatigue);
        Ok(result)
    }

    /// Simulate an ad-hoc plan; requires a well name and a positive depth.
    pub fn simulate_custom(&self, plan: &JobPlan) -> Result<SimulationResult, SimulationError> {
        info!(well = ?plan.well_name, "Simulating custom job");
        plan.validate_custom()?;
        let result = self.simulate(plan)?;
        info!(
            feasible = result.feasibility.feasible,
            duration_hours = result.times.map_or(0.0, |t| t.total_hours),
            "Custom simulation completed"
        );
        Ok(result)
    }

    /// Simulate independent plans in parallel, preserving input order.
    pub fn simulate_batch(&self, plans: &[JobPlan]) -> Vec<Result<SimulationResult, SimulationError>> {
        plans.par_iter().map(|plan| self.simulate(plan)).collect()
    }
}

impl Default for JobSimulator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewReel, PlannedJob};
    use uuid::Uuid;

    fn base_plan() -> JobPlan {
        let reel = NewReel::new("R-1").into_state(Uuid::nil());
        let job = PlannedJob {
            well_name: Some("Unit-Test-1".to_string()),
            ..PlannedJob::default()
        };
        JobPlan::for_reel(&job, &reel)
    }

    #[test]
    fn test_times_default_plan() {
        let t = JobSimulator::default().estimate_times(&base_plan());
        // 10 000 ft at 60 ft/min
        assert!((t.run_in_hours - 10_000.0 / 3_600.0).abs() < 1e-12);
        assert!((t.pull_out_hours - 0.7 * t.run_in_hours).abs() < 1e-12);
        assert_eq!(t.on_depth_hours, 2.0);
        let sum = 2.0 + t.run_in_hours + 2.0 + t.pull_out_hours + 1.5;
        assert!((t.total_hours - sum).abs() < 1e-12);
    }

    #[test]
    fn test_on_depth_falls_back_to_one_hour() {
        let mut plan = base_plan();
        plan.treatment_hours = None;
        assert_eq!(JobSimulator::default().estimate_times(&plan).on_depth_hours, 1.0);
    }

    #[test]
    fn test_fatigue_prediction_placeholder() {
        let sim = JobSimulator::default();
        let result = sim.simulate(&base_plan()).unwrap();
        let fatigue = result.fatigue.unwrap();
        assert_eq!(fatigue.cycles, 2);
        assert!((fatigue.estimated_fatigue_percent - 0.02).abs() < 1e-15);
        let forces = result.forces.unwrap();
        let area = TubingGeometry::new(2.375, 1.995).steel_area_in2();
        assert!((fatigue.average_stress_psi - forces.max_hookload_lbf / area).abs() < 1e-9);
    }

    #[test]
    fn test_all_limiting_factors_reported() {
        let mut plan = base_plan();
        plan.target_depth_ft = 25_000.0;
        plan.max_pressure_psi = 40_000.0;
        plan.wellbore_diameter_in = 2.0;
        let f = JobSimulator::default().check_feasibility(&plan);
        assert!(!f.feasible);
        assert_eq!(f.limiting_factors.len(), 3);
        assert_eq!(f.warnings, vec!["Deep well - expect high friction forces".to_string()]);
    }

    #[test]
    fn test_invalid_plan_is_error() {
        let mut plan = base_plan();
        plan.max_running_speed_ft_min = 0.0;
        assert!(JobSimulator::default().simulate(&plan).is_err());
    }
}
