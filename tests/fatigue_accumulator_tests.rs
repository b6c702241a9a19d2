//! Fatigue accumulator behavior tests
//!
//! Drives `FatigueAccumulator::calculate` with reel snapshots the way the
//! service does, checking accumulation, clamping and the skip/error split.

use chrono::{TimeZone, Utc};
use ct_integrity::config::FatigueConfig;
use ct_integrity::types::{FatigueLogRecord, FatigueStatus, NewReel, ReelState};
use ct_integrity::{
    FatigueAccumulator, FatigueError, FatigueOutcome, SkipReason, TelemetrySample, TravelDirection,
};
use uuid::Uuid;

// ============================================================================
// Helpers
// ============================================================================

fn standard_reel() -> ReelState {
    NewReel::new("R-FAT-1").into_state(Uuid::new_v4())
}

/// Reel bent over a huge radius so bending stress is negligible and
/// pressure alone sets the damage rate.
fn straight_reel() -> ReelState {
    let mut reel = standard_reel();
    reel.gooseneck_radius_in = 1e6;
    reel
}

fn accepted(outcome: FatigueOutcome) -> ct_integrity::FatigueUpdate {
    match outcome {
        FatigueOutcome::Accepted(update) => update,
        FatigueOutcome::Skipped { reason } => panic!("expected accepted update, skipped: {reason}"),
    }
}

// ============================================================================
// Reference cases
// ============================================================================

#[test]
fn test_moving_sample_adds_one_cycle() {
    let acc = FatigueAccumulator::default();
    let reel = standard_reel();
    let sample = TelemetrySample::new(5000.0, 10_000.0, TravelDirection::In);

    let update = accepted(acc.calculate(&sample, &reel).unwrap());

    assert!(update.fatigue_increment > 0.0);
    assert_eq!(update.total_cycles, 1);
    assert_eq!(update.direction, TravelDirection::In);
    assert_eq!(update.bend_radius_in, 72.0);
    assert_eq!(update.method, "PALMGREN_MINER");
    assert_eq!(update.notes, "Direction: IN");
    // 2.375" pipe over a 72" gooseneck is deep in plastic bending: the S-N
    // curve bottoms out at one cycle to failure.
    assert_eq!(update.cycles_to_failure, 1);
    assert_eq!(update.status, FatigueStatus::Critical);
}

#[test]
fn test_stopped_sample_adds_no_damage() {
    let acc = FatigueAccumulator::default();
    let reel = standard_reel();
    let sample = TelemetrySample::new(5000.0, 10_000.0, TravelDirection::Stopped);

    let update = accepted(acc.calculate(&sample, &reel).unwrap());

    assert_eq!(update.fatigue_increment, 0.0);
    assert_eq!(update.total_cycles, 0);
    assert_eq!(update.accumulated_fatigue_percent, 0.0);
    // Parked on the reel core: 96" diameter → 48" radius
    assert_eq!(update.bend_radius_in, 48.0);
    assert_eq!(update.notes, "Direction: STOPPED");
}

#[test]
fn test_low_damage_sample_stays_normal() {
    let acc = FatigueAccumulator::default();
    let reel = straight_reel();
    let sample = TelemetrySample::new(2000.0, 0.0, TravelDirection::Out);

    let update = accepted(acc.calculate(&sample, &reel).unwrap());

    assert_eq!(update.status, FatigueStatus::Normal);
    assert_eq!(update.stresses.hoop_psi, 10_500.0);
    assert_eq!(update.cycles_to_failure, 8);
    assert!((update.accumulated_fatigue_percent - 11.792).abs() < 1e-9);
    // 88.208% left at 11.792%/cycle
    assert_eq!(update.estimated_remaining_cycles, 7);
}

// ============================================================================
// Accumulation invariants
// ============================================================================

#[test]
fn test_accumulation_is_monotonic_and_capped() {
    let acc = FatigueAccumulator::default();
    let mut reel = straight_reel();
    let sample = TelemetrySample::new(2000.0, 0.0, TravelDirection::In);
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

    let mut previous = 0.0;
    for i in 1..=12u32 {
        let update = accepted(acc.calculate(&sample, &reel).unwrap());
        reel.apply(&update, at);
        assert!(reel.accumulated_fatigue_percent >= previous);
        assert!(reel.accumulated_fatigue_percent <= 100.0);
        assert_eq!(reel.total_cycles, i);
        previous = reel.accumulated_fatigue_percent;
    }

    assert_eq!(reel.accumulated_fatigue_percent, 100.0);
    assert_eq!(reel.estimated_remaining_cycles, Some(0));
    assert_eq!(reel.fatigue_method.as_deref(), Some("PALMGREN_MINER"));
    assert_eq!(reel.last_updated, Some(at));
}

#[test]
fn test_cycles_to_failure_within_bounds() {
    let acc = FatigueAccumulator::default();
    let reel = straight_reel();
    for pressure in [250.0, 1_000.0, 5_000.0, 20_000.0, 100_000.0] {
        let sample = TelemetrySample::new(pressure, 5_000.0, TravelDirection::In);
        if let FatigueOutcome::Accepted(update) = acc.calculate(&sample, &reel).unwrap() {
            assert!(update.cycles_to_failure >= 1);
            assert!(update.cycles_to_failure <= 1_000_000_000);
        }
    }
}

#[test]
fn test_calculation_is_deterministic() {
    let acc = FatigueAccumulator::default();
    let reel = straight_reel();
    let sample = TelemetrySample::new(3_500.0, 12_000.0, TravelDirection::Out).with_temperature(140.0);
    let first = acc.calculate(&sample, &reel).unwrap();
    let second = acc.calculate(&sample, &reel).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_correction_factors_scale_increment() {
    let acc = FatigueAccumulator::default();
    let sweet = straight_reel();
    let mut sour = sweet.clone();
    sour.corrosion_environment = Some("SOUR".to_string());
    sour.weld_factor = 1.2;

    let sample = TelemetrySample::new(2000.0, 0.0, TravelDirection::In).with_temperature(170.0);
    let base = accepted(acc.calculate(&sample, &sweet).unwrap());
    let harsh = accepted(acc.calculate(&sample, &sour).unwrap());

    assert_eq!(harsh.factors.corrosion, 1.5);
    assert_eq!(harsh.factors.weld, 1.2);
    assert_eq!(harsh.factors.temperature, 1.1);
    let ratio = harsh.accumulated_fatigue_percent_raw / base.accumulated_fatigue_percent_raw;
    assert!((ratio - 1.8).abs() < 1e-9);
}

#[test]
fn test_unknown_corrosion_environment_is_neutral() {
    let acc = FatigueAccumulator::default();
    let mut reel = straight_reel();
    reel.corrosion_environment = Some("sour".to_string());
    let sample = TelemetrySample::new(2000.0, 0.0, TravelDirection::In);
    let update = accepted(acc.calculate(&sample, &reel).unwrap());
    assert_eq!(update.factors.corrosion, 1.0);
}

// ============================================================================
// Skips and errors
// ============================================================================

#[test]
fn test_low_stress_sample_skipped() {
    let acc = FatigueAccumulator::default();
    let mut reel = standard_reel();
    reel.gooseneck_radius_in = 1e7;
    let sample = TelemetrySample::new(100.0, 0.0, TravelDirection::In);
    assert_eq!(
        acc.calculate(&sample, &reel).unwrap(),
        FatigueOutcome::Skipped {
            reason: SkipReason::BelowStressThreshold
        }
    );
}

#[test]
fn test_invalid_samples_skipped() {
    let acc = FatigueAccumulator::default();
    let reel = standard_reel();

    let negative = TelemetrySample::new(-5.0, 10_000.0, TravelDirection::In);
    let nan = TelemetrySample::new(5_000.0, f64::NAN, TravelDirection::In);
    let mut no_direction = TelemetrySample::new(5_000.0, 10_000.0, TravelDirection::In);
    no_direction.direction = None;

    for sample in [negative, nan, no_direction] {
        assert_eq!(
            acc.calculate(&sample, &reel).unwrap(),
            FatigueOutcome::Skipped {
                reason: SkipReason::InvalidTelemetry
            }
        );
    }
}

#[test]
fn test_degenerate_geometry_is_an_error() {
    let acc = FatigueAccumulator::default();
    let mut reel = standard_reel();
    reel.tubing_id_in = reel.tubing_od_in;
    let sample = TelemetrySample::new(5_000.0, 10_000.0, TravelDirection::In);
    assert!(acc.calculate(&sample, &reel).is_err());
}

#[test]
fn test_non_finite_temperature_is_an_error() {
    let acc = FatigueAccumulator::default();
    let reel = standard_reel();

    for temperature in [f64::NAN, f64::NEG_INFINITY, f64::INFINITY] {
        let sample = TelemetrySample::new(5_000.0, 10_000.0, TravelDirection::In)
            .with_temperature(temperature);
        match acc.calculate(&sample, &reel) {
            Err(FatigueError::NonFinite { reel_id, field }) => {
                assert_eq!(reel_id, reel.reel_id);
                assert_eq!(field, "temperature_f");
            }
            other => panic!("expected non-finite error for {temperature}, got {other:?}"),
        }
    }

    // Stopped samples still record factors, so they must not slip through either
    let parked = TelemetrySample::new(5_000.0, 10_000.0, TravelDirection::Stopped)
        .with_temperature(f64::NAN);
    assert!(acc.calculate(&parked, &reel).is_err());
}

#[test]
fn test_non_finite_weld_factor_is_an_error() {
    let acc = FatigueAccumulator::default();
    let mut reel = standard_reel();
    reel.weld_factor = f64::NAN;
    let sample = TelemetrySample::new(5_000.0, 10_000.0, TravelDirection::In);

    assert_eq!(
        acc.calculate(&sample, &reel),
        Err(FatigueError::NonFinite {
            reel_id: reel.reel_id,
            field: "weld_factor"
        })
    );
}

#[test]
fn test_custom_threshold_from_config() {
    let config = FatigueConfig {
        stress_threshold_psi: 20_000.0,
        ..FatigueConfig::default()
    };
    let acc = FatigueAccumulator::new(config);
    let sample = TelemetrySample::new(2000.0, 0.0, TravelDirection::In);
    let outcome = acc.calculate(&sample, &straight_reel()).unwrap();
    assert!(!outcome.is_accepted());
}

// ============================================================================
// Audit record
// ============================================================================

#[test]
fn test_log_record_mirrors_update() {
    let acc = FatigueAccumulator::default();
    let reel = straight_reel();
    let sample = TelemetrySample::new(2000.004, 0.0, TravelDirection::In).with_temperature(85.125);
    let update = accepted(acc.calculate(&sample, &reel).unwrap());
    assert_eq!(update.pressure_psi, 2000.0);
    assert_eq!(update.temperature_f, 85.13);

    let job = Uuid::new_v4();
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap();
    let record = FatigueLogRecord::from_update(reel.tenant_id, reel.reel_id, Some(job), at, &update);

    assert_eq!(record.cycle_number, 1);
    assert_eq!(record.job_id, Some(job));
    assert_eq!(record.temperature_f, 85.13);
    assert_eq!(record.calculation_method, "PALMGREN_MINER");

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["reelId"], reel.reel_id.to_string());
    assert_eq!(json["timestamp"], at.timestamp_millis());
    assert!(json.get("vonMisesStressPsi").is_some());
}
