//! Risk rules applied to a completed force/hydraulic analysis.
//!
//! Rules are evaluated in a fixed order and each contributes at most one
//! entry, so the output order is stable for reporting.

use crate::config::RiskThresholds;
use crate::types::{ForceProfile, HydraulicProfile, JobPlan, Risk, RiskSeverity, RiskType};

pub fn identify_risks(
    plan: &JobPlan,
    forces: &ForceProfile,
    hydraulics: Option<&HydraulicProfile>,
    thresholds: &RiskThresholds,
) -> Vec<Risk> {
    let mut risks = Vec::new();

    if forces.max_hookload_lbf > plan.unit_max_tension_lbf * thresholds.tension_utilization {
        risks.push(Risk {
            severity: RiskSeverity::High,
            risk_type: RiskType::TensionLimit,
            description: format!(
                "Hookload near unit capacity: {} lbf",
                forces.max_hookload_lbf.round() as i64
            ),
        });
    }

    if forces
        .points
        .iter()
        .any(|p| p.buckling_margin_percent < thresholds.buckling_margin_percent)
    {
        risks.push(Risk {
            severity: RiskSeverity::Medium,
            risk_type: RiskType::Buckling,
            description: "Low buckling margin in deviated sections".to_string(),
        });
    }

    if let Some(h) = hydraulics {
        if h.max_pressure_psi > plan.unit_max_pressure_psi * thresholds.pressure_utilization {
            risks.push(Risk {
                severity: RiskSeverity::High,
                risk_type: RiskType::PressureLimit,
                description: format!(
                    "Pressure near unit capacity: {} psi",
                    h.max_pressure_psi.round() as i64
                ),
            });
        }
    }

    if plan.max_inclination_deg > thresholds.stuck_pipe_inclination_deg
        && plan.target_depth_ft > thresholds.stuck_pipe_depth_ft
    {
        risks.push(Risk {
            severity: RiskSeverity::Medium,
            risk_type: RiskType::StuckPipe,
            description: "High deviation and depth increase stuck pipe risk".to_string(),
        });
    }

    risks
}
