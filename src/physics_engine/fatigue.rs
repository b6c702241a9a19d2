//! Palmgren-Miner fatigue accumulator
//!
//! One call per telemetry sample. The accumulator is pure: it reads the reel
//! snapshot, never mutates it, and returns an outcome the caller commits with
//! [`ReelState::apply`]. Serializing updates per reel is the caller's job
//! (see `service::ReelFatigueService`).

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::{defaults, FatigueConfig};
use crate::types::{
    CorrectionFactors, FatigueOutcome, FatigueStatus, FatigueUpdate, ReelState, SkipReason,
    StressState, TelemetrySample,
};

use super::materials::{self, MaterialProperties};
use super::precision::{round_half_up, round_to_count};
use super::stress::{compute_stresses, TubingGeometry};

/// A calculation that produced a non-finite value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FatigueError {
    #[error("non-finite {field} for reel {reel_id}")]
    NonFinite { reel_id: Uuid, field: &'static str },
}

/// Applies the S-N curve and correction factors to one sample at a time.
#[derive(Debug, Clone, Default)]
pub struct FatigueAccumulator {
    config: FatigueConfig,
}

impl FatigueAccumulator {
    pub fn new(config: FatigueConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FatigueConfig {
        &self.config
    }

    /// Material used for a reel, honoring the configured fallback grade.
    pub fn material_for(&self, reel: &ReelState) -> MaterialProperties {
        materials::lookup_or(&reel.material_grade, &self.config.default_material_grade)
    }

    /// S-N cycles to failure, clamped to the configured bounds.
    pub fn cycles_to_failure(&self, von_mises_psi: f64, material: &MaterialProperties) -> f64 {
        let n = material.sn_constant * von_mises_psi.powf(-material.sn_exponent);
        n.min(self.config.max_cycles_to_failure)
            .max(self.config.min_cycles_to_failure)
    }

    pub fn temperature_factor(&self, temperature_f: f64) -> f64 {
        1.0 + (temperature_f - self.config.reference_temperature_f)
            / self.config.temperature_sensitivity_f
    }

    /// Cycles left at the reel's average damage rate so far.
    pub fn remaining_cycles(&self, percent: f64, total_cycles: u32) -> u64 {
        let avg_per_cycle = percent / f64::from(total_cycles.max(1));
        let remaining =
            (100.0 - percent) / avg_per_cycle.max(self.config.min_damage_per_cycle_percent);
        round_to_count(remaining.floor())
    }

    /// Run one sample against the reel's current snapshot.
    ///
    /// `Ok(Skipped)` for invalid or low-stress samples, `Err` when any
    /// intermediate value is non-finite. Neither may be committed to state.
    pub fn calculate(
        &self,
        sample: &TelemetrySample,
        reel: &ReelState,
    ) -> Result<FatigueOutcome, FatigueError> {
        debug!(reel_id = %reel.reel_id, "Calculating fatigue");

        let direction = match sample.direction {
            Some(d) if sample.is_valid() => d,
            _ => {
                debug!(reel_id = %reel.reel_id, "Invalid telemetry, skipping calculation");
                return Ok(FatigueOutcome::Skipped {
                    reason: SkipReason::InvalidTelemetry,
                });
            }
        };

        let material = self.material_for(reel);
        let geometry = TubingGeometry::new(reel.tubing_od_in, reel.tubing_id_in);
        let radius = reel.bend_radius_in(direction);

        let stresses = compute_stresses(
            &geometry,
            sample.pressure_psi,
            sample.tension_lbf,
            radius,
            material.youngs_modulus_psi,
        );
        if let Some(field) = stresses.non_finite_field() {
            return Err(self.non_finite(reel, field));
        }
        if !sample.temperature_f.is_finite() {
            return Err(self.non_finite(reel, "temperature_f"));
        }

        if stresses.von_mises_psi < self.config.stress_threshold_psi {
            debug!(
                reel_id = %reel.reel_id,
                von_mises_psi = stresses.von_mises_psi,
                "Stress below threshold, skipping fatigue calculation"
            );
            return Ok(FatigueOutcome::Skipped {
                reason: SkipReason::BelowStressThreshold,
            });
        }

        let cycles_to_failure = self.cycles_to_failure(stresses.von_mises_psi, &material);
        if !cycles_to_failure.is_finite() {
            return Err(self.non_finite(reel, "cycles_to_failure"));
        }

        let factors = CorrectionFactors {
            corrosion: materials::corrosion_factor(reel.corrosion_environment.as_deref()),
            weld: reel.weld_factor,
            temperature: self.temperature_factor(sample.temperature_f),
        };

        if let Some(field) = factors.non_finite_field() {
            return Err(self.non_finite(reel, field));
        }

        let moving = direction.is_moving();
        let raw_increment = if moving {
            (1.0 / cycles_to_failure) * factors.combined()
        } else {
            0.0
        };
        // f64::max would swallow a NaN here
        if !raw_increment.is_finite() {
            return Err(self.non_finite(reel, "fatigue_increment"));
        }
        let increment = raw_increment.max(0.0);

        let new_percent = (reel.accumulated_fatigue_percent + increment * 100.0).min(100.0);
        if !new_percent.is_finite() {
            return Err(self.non_finite(reel, "accumulated_fatigue_percent"));
        }
        let total_cycles = if moving {
            reel.total_cycles.saturating_add(1)
        } else {
            reel.total_cycles
        };

        let update = FatigueUpdate {
            direction,
            pressure_psi: round_half_up(sample.pressure_psi, 2),
            tension_lbf: round_half_up(sample.tension_lbf, 2),
            bend_radius_in: round_half_up(radius, 2),
            temperature_f: round_half_up(sample.temperature_f, 2),
            stresses: StressState {
                hoop_psi: round_half_up(stresses.hoop_psi, 0),
                axial_psi: round_half_up(stresses.axial_psi, 0),
                bending_psi: round_half_up(stresses.bending_psi, 0),
                von_mises_psi: round_half_up(stresses.von_mises_psi, 0),
            },
            cycles_to_failure: round_to_count(cycles_to_failure),
            fatigue_increment: round_half_up(increment, 10),
            accumulated_fatigue_percent: round_half_up(new_percent, 3),
            accumulated_fatigue_percent_raw: new_percent,
            total_cycles,
            estimated_remaining_cycles: self.remaining_cycles(new_percent, total_cycles),
            status: FatigueStatus::from_percent(new_percent, &self.config),
            factors: CorrectionFactors {
                corrosion: round_half_up(factors.corrosion, 3),
                weld: round_half_up(factors.weld, 3),
                temperature: round_half_up(factors.temperature, 3),
            },
            method: defaults::FATIGUE_METHOD.to_string(),
            notes: format!("Direction: {direction}"),
        };

        info!(
            reel_id = %reel.reel_id,
            status = %update.status,
            "Fatigue calculated for reel {}: {}% (increment: {}%)",
            reel.reel_id,
            round_half_up(new_percent, 2),
            round_half_up(increment * 100.0, 4)
        );

        Ok(FatigueOutcome::Accepted(update))
    }

    fn non_finite(&self, reel: &ReelState, field: &'static str) -> FatigueError {
        error!(reel_id = %reel.reel_id, field, "Error calculating fatigue: non-finite value");
        FatigueError::NonFinite {
            reel_id: reel.reel_id,
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewReel, TravelDirection};

    fn reel() -> ReelState {
        NewReel::new("R-TEST").into_state(Uuid::nil())
    }

    #[test]
    fn test_cycles_to_failure_clamped() {
        let acc = FatigueAccumulator::default();
        let qt800 = materials::lookup("QT-800");
        assert_eq!(acc.cycles_to_failure(500_000.0, &qt800), 1.0);
        assert_eq!(acc.cycles_to_failure(10.0, &qt800), 1e9);
    }

    #[test]
    fn test_temperature_factor() {
        let acc = FatigueAccumulator::default();
        assert!((acc.temperature_factor(70.0) - 1.0).abs() < 1e-12);
        assert!((acc.temperature_factor(170.0) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_remaining_cycles_floor_and_min_rate() {
        let acc = FatigueAccumulator::default();
        // 10% over 10 cycles → 1%/cycle → 90 left
        assert_eq!(acc.remaining_cycles(10.0, 10), 90);
        // No damage yet: floor rate 0.001%/cycle
        assert_eq!(acc.remaining_cycles(0.0, 0), 100_000);
    }

    #[test]
    fn test_stopped_sample_skips_damage() {
        let acc = FatigueAccumulator::default();
        let sample = TelemetrySample::new(5000.0, 10_000.0, TravelDirection::Stopped);
        let outcome = acc.calculate(&sample, &reel()).unwrap();
        let update = outcome.update().unwrap();
        assert_eq!(update.fatigue_increment, 0.0);
        assert_eq!(update.total_cycles, 0);
        assert_eq!(update.bend_radius_in, 48.0);
        assert_eq!(update.notes, "Direction: STOPPED");
    }

    #[test]
    fn test_degenerate_geometry_errors() {
        let acc = FatigueAccumulator::default();
        let mut r = reel();
        r.tubing_id_in = r.tubing_od_in;
        let sample = TelemetrySample::new(5000.0, 10_000.0, TravelDirection::In);
        let err = acc.calculate(&sample, &r).unwrap_err();
        assert!(matches!(err, FatigueError::NonFinite { .. }));
    }

    #[test]
    fn test_non_finite_factors_error_before_clamp() {
        let acc = FatigueAccumulator::default();
        let sample = TelemetrySample::new(5000.0, 10_000.0, TravelDirection::In);

        let mut r = reel();
        r.weld_factor = f64::NAN;
        let err = acc.calculate(&sample, &r).unwrap_err();
        assert_eq!(
            err,
            FatigueError::NonFinite {
                reel_id: r.reel_id,
                field: "weld_factor"
            }
        );

        r.weld_factor = f64::NEG_INFINITY;
        assert!(acc.calculate(&sample, &r).is_err());
    }
}
