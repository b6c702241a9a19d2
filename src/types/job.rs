//! Job plans and simulation results

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::defaults;

// ============================================================================
// Job Plan
// ============================================================================

/// Planned CT job, the input to the simulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPlan {
    #[serde(default)]
    pub job_id: Option<Uuid>,
    #[serde(default)]
    pub well_name: Option<String>,
    pub target_depth_ft: f64,
    pub wellbore_diameter_in: f64,
    pub max_inclination_deg: f64,
    pub tubing_od_in: f64,
    pub tubing_id_in: f64,
    pub tubing_length_ft: f64,
    #[serde(default = "default_fluid_density")]
    pub fluid_density_ppg: f64,
    /// Absent or zero means no pumping, so no hydraulic profile.
    #[serde(default)]
    pub pump_rate_bpm: Option<f64>,
    pub max_pressure_psi: f64,
    #[serde(default = "default_running_speed")]
    pub max_running_speed_ft_min: f64,
    pub unit_max_pressure_psi: f64,
    pub unit_max_tension_lbf: f64,
    #[serde(default)]
    pub treatment_hours: Option<f64>,
}

fn default_fluid_density() -> f64 {
    defaults::DEFAULT_FLUID_DENSITY_PPG
}

fn default_running_speed() -> f64 {
    defaults::DEFAULT_RUNNING_SPEED_FT_MIN
}

/// A scheduled job as recorded by dispatch; any field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannedJob {
    #[serde(default)]
    pub job_id: Option<Uuid>,
    #[serde(default)]
    pub well_name: Option<String>,
    #[serde(default)]
    pub target_depth_to_ft: Option<f64>,
    #[serde(default)]
    pub planned_pump_rate_bpm: Option<f64>,
    #[serde(default)]
    pub max_planned_pressure_psi: Option<f64>,
    #[serde(default)]
    pub max_planned_speed_ft_min: Option<f64>,
    #[serde(default)]
    pub estimated_duration_hours: Option<f64>,
}

// ============================================================================
// Simulation Result
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Feasibility {
    pub feasible: bool,
    pub limiting_factors: Vec<String>,
    pub warnings: Vec<String>,
}

/// One depth station of the force profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForcePoint {
    pub depth_ft: f64,
    pub hookload_lbf: f64,
    pub friction_lbf: f64,
    /// Headroom to Euler buckling, 0..=100.
    pub buckling_margin_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForceProfile {
    pub points: Vec<ForcePoint>,
    pub max_hookload_lbf: f64,
}

impl ForceProfile {
    pub fn min_buckling_margin(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.buckling_margin_percent)
            .reduce(f64::min)
    }
}

/// One depth station of the hydraulic profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HydraulicPoint {
    pub depth_ft: f64,
    pub pressure_psi: f64,
    pub friction_pressure_psi: f64,
    pub velocity_ft_s: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HydraulicProfile {
    pub points: Vec<HydraulicPoint>,
    pub max_pressure_psi: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TimeEstimate {
    pub rig_up_hours: f64,
    pub run_in_hours: f64,
    pub on_depth_hours: f64,
    pub pull_out_hours: f64,
    pub rig_down_hours: f64,
    pub total_hours: f64,
}

/// Rough per-job fatigue consumption; not derived from the accumulator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FatiguePrediction {
    pub cycles: u32,
    pub estimated_fatigue_percent: f64,
    pub average_stress_psi: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskSeverity {
    High,
    Medium,
}

impl std::fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskSeverity::High => write!(f, "HIGH"),
            RiskSeverity::Medium => write!(f, "MEDIUM"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskType {
    TensionLimit,
    Buckling,
    PressureLimit,
    StuckPipe,
}

impl std::fmt::Display for RiskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskType::TensionLimit => write!(f, "TENSION_LIMIT"),
            RiskType::Buckling => write!(f, "BUCKLING"),
            RiskType::PressureLimit => write!(f, "PRESSURE_LIMIT"),
            RiskType::StuckPipe => write!(f, "STUCK_PIPE"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Risk {
    pub severity: RiskSeverity,
    pub risk_type: RiskType,
    pub description: String,
}

/// Full simulator output. Infeasible plans carry only `feasibility`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub job_id: Option<Uuid>,
    pub well_name: Option<String>,
    pub feasibility: Feasibility,
    pub forces: Option<ForceProfile>,
    pub hydraulics: Option<HydraulicProfile>,
    pub times: Option<TimeEstimate>,
    pub fatigue: Option<FatiguePrediction>,
    pub risks: Vec<Risk>,
}

impl SimulationResult {
    pub fn has_risk(&self, risk_type: RiskType) -> bool {
        self.risks.iter().any(|r| r.risk_type == risk_type)
    }
}
