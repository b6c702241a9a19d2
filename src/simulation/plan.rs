//! Job plan validation and construction from dispatch records

use crate::config::defaults;
use crate::types::{JobPlan, PlannedJob, ReelState};

use super::SimulationError;

impl JobPlan {
    /// Reject inputs no closed-form model can do anything sensible with.
    ///
    /// Every numeric field must be finite and non-negative; running speed
    /// must be strictly positive (run-in time divides by it).
    pub fn validate(&self) -> Result<(), SimulationError> {
        let required = [
            ("target_depth_ft", self.target_depth_ft),
            ("wellbore_diameter_in", self.wellbore_diameter_in),
            ("max_inclination_deg", self.max_inclination_deg),
            ("tubing_od_in", self.tubing_od_in),
            ("tubing_id_in", self.tubing_id_in),
            ("tubing_length_ft", self.tubing_length_ft),
            ("fluid_density_ppg", self.fluid_density_ppg),
            ("max_pressure_psi", self.max_pressure_psi),
            ("max_running_speed_ft_min", self.max_running_speed_ft_min),
            ("unit_max_pressure_psi", self.unit_max_pressure_psi),
            ("unit_max_tension_lbf", self.unit_max_tension_lbf),
        ];
        let optional = [
            ("pump_rate_bpm", self.pump_rate_bpm),
            ("treatment_hours", self.treatment_hours),
        ];

        let fields = required
            .into_iter()
            .chain(optional.into_iter().filter_map(|(n, v)| v.map(|v| (n, v))));
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(SimulationError::InvalidField {
                    field,
                    reason: format!("{value} is not a finite number"),
                });
            }
            if value < 0.0 {
                return Err(SimulationError::InvalidField {
                    field,
                    reason: format!("{value} cannot be negative"),
                });
            }
        }

        if self.max_running_speed_ft_min <= 0.0 {
            return Err(SimulationError::InvalidField {
                field: "max_running_speed_ft_min",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Extra requirements for an ad-hoc plan not tied to a dispatched job.
    pub fn validate_custom(&self) -> Result<(), SimulationError> {
        if self.well_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(SimulationError::MissingWellName);
        }
        if !(self.target_depth_ft > 0.0) {
            return Err(SimulationError::NonPositiveDepth(self.target_depth_ft));
        }
        self.validate()
    }

    /// Build a plan for running `reel` on a dispatched `job`.
    ///
    /// Job fields that dispatch left empty, plus the wellbore, profile and
    /// unit data dispatch does not carry, take the standard planning values.
    pub fn for_reel(job: &PlannedJob, reel: &ReelState) -> Self {
        Self {
            job_id: job.job_id,
            well_name: job.well_name.clone(),
            target_depth_ft: job
                .target_depth_to_ft
                .unwrap_or(defaults::DEFAULT_TARGET_DEPTH_FT),
            wellbore_diameter_in: defaults::DEFAULT_WELLBORE_DIAMETER_IN,
            max_inclination_deg: defaults::DEFAULT_MAX_INCLINATION_DEG,
            tubing_od_in: reel.tubing_od_in,
            tubing_id_in: reel.tubing_id_in,
            tubing_length_ft: reel.total_length_ft,
            fluid_density_ppg: defaults::DEFAULT_FLUID_DENSITY_PPG,
            pump_rate_bpm: job.planned_pump_rate_bpm,
            max_pressure_psi: job
                .max_planned_pressure_psi
                .unwrap_or(defaults::DEFAULT_MAX_PRESSURE_PSI),
            max_running_speed_ft_min: job
                .max_planned_speed_ft_min
                .unwrap_or(defaults::DEFAULT_RUNNING_SPEED_FT_MIN),
            unit_max_pressure_psi: defaults::DEFAULT_UNIT_PRESSURE_CAPACITY_PSI,
            unit_max_tension_lbf: defaults::DEFAULT_UNIT_TENSION_CAPACITY_LBF,
            treatment_hours: Some(
                job.estimated_duration_hours
                    .unwrap_or(defaults::DEFAULT_TREATMENT_HOURS),
            ),
        }
    }
}
