//! Fatigue telemetry, updates and audit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{defaults, FatigueConfig};

use super::TravelDirection;

// ============================================================================
// Telemetry
// ============================================================================

/// One operational reading from the injector head.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySample {
    pub pressure_psi: f64,
    pub tension_lbf: f64,
    #[serde(default = "default_temperature")]
    pub temperature_f: f64,
    #[serde(default, deserialize_with = "deserialize_direction")]
    pub direction: Option<TravelDirection>,
    /// Job the sample was recorded under, carried into the audit record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

fn default_temperature() -> f64 {
    defaults::DEFAULT_TEMPERATURE_F
}

/// Same leniency as CSV input: any case, RIH/POOH aliases, blank means unset.
fn deserialize_direction<'de, D>(deserializer: D) -> Result<Option<TravelDirection>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl TelemetrySample {
    pub fn new(pressure_psi: f64, tension_lbf: f64, direction: TravelDirection) -> Self {
        Self {
            pressure_psi,
            tension_lbf,
            temperature_f: defaults::DEFAULT_TEMPERATURE_F,
            direction: Some(direction),
            job_id: None,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature_f: f64) -> Self {
        self.temperature_f = temperature_f;
        self
    }

    /// Loads must be finite and non-negative, and a direction must be known.
    pub fn is_valid(&self) -> bool {
        let load_ok = |v: f64| v.is_finite() && v >= 0.0;
        load_ok(self.pressure_psi) && load_ok(self.tension_lbf) && self.direction.is_some()
    }
}

// ============================================================================
// Stresses and Factors
// ============================================================================

/// Stress components at the tubing outer fibre (psi).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StressState {
    pub hoop_psi: f64,
    pub axial_psi: f64,
    pub bending_psi: f64,
    pub von_mises_psi: f64,
}

impl StressState {
    /// Name of the first non-finite component, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("hoop_stress", self.hoop_psi),
            ("axial_stress", self.axial_psi),
            ("bending_stress", self.bending_psi),
            ("von_mises_stress", self.von_mises_psi),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Multipliers applied to the raw Miner increment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CorrectionFactors {
    pub corrosion: f64,
    pub weld: f64,
    pub temperature: f64,
}

impl CorrectionFactors {
    pub fn combined(&self) -> f64 {
        self.corrosion * self.weld * self.temperature
    }

    /// First factor that is NaN or infinite, by name.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("corrosion_factor", self.corrosion),
            ("weld_factor", self.weld),
            ("temperature_factor", self.temperature),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FatigueStatus {
    #[default]
    Normal,
    High,
    Critical,
}

impl FatigueStatus {
    pub fn from_percent(percent: f64, config: &FatigueConfig) -> Self {
        if percent >= config.critical_status_percent {
            FatigueStatus::Critical
        } else if percent >= config.high_status_percent {
            FatigueStatus::High
        } else {
            FatigueStatus::Normal
        }
    }
}

impl std::fmt::Display for FatigueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FatigueStatus::Normal => write!(f, "NORMAL"),
            FatigueStatus::High => write!(f, "HIGH"),
            FatigueStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ============================================================================
// Accumulator Output
// ============================================================================

/// Result of one accepted fatigue calculation, rounded for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FatigueUpdate {
    pub direction: TravelDirection,
    /// 2 dp
    pub pressure_psi: f64,
    /// 2 dp
    pub tension_lbf: f64,
    /// 2 dp
    pub bend_radius_in: f64,
    /// 2 dp
    pub temperature_f: f64,
    /// Whole psi
    pub stresses: StressState,
    pub cycles_to_failure: u64,
    /// Percent-of-life fraction for this sample, 10 dp
    pub fatigue_increment: f64,
    /// 3 dp
    pub accumulated_fatigue_percent: f64,
    /// Unrounded value committed to reel state.
    pub accumulated_fatigue_percent_raw: f64,
    pub total_cycles: u32,
    pub estimated_remaining_cycles: u64,
    pub status: FatigueStatus,
    /// 3 dp each
    pub factors: CorrectionFactors,
    pub method: String,
    pub notes: String,
}

/// Why a sample produced no update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    InvalidTelemetry,
    BelowStressThreshold,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InvalidTelemetry => write!(f, "Invalid telemetry"),
            SkipReason::BelowStressThreshold => write!(f, "Stress below threshold"),
        }
    }
}

/// Non-error outcome of a fatigue calculation. Computation failures are
/// returned as `Err(FatigueError)` instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FatigueOutcome {
    Accepted(FatigueUpdate),
    Skipped { reason: SkipReason },
}

impl FatigueOutcome {
    pub fn update(&self) -> Option<&FatigueUpdate> {
        match self {
            FatigueOutcome::Accepted(u) => Some(u),
            FatigueOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, FatigueOutcome::Accepted(_))
    }
}

// ============================================================================
// Audit Log Record
// ============================================================================

/// One row of the per-reel fatigue audit trail.
///
/// Field names follow the historical log DTO (camelCase, epoch-millis timestamp)
/// so exported history stays readable by existing dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FatigueLogRecord {
    pub tenant_id: Uuid,
    pub reel_id: Uuid,
    #[serde(default)]
    pub job_id: Option<Uuid>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub cycle_number: u32,
    pub pressure_psi: f64,
    pub tension_lbf: f64,
    pub bend_radius_in: f64,
    pub temperature_f: f64,
    pub hoop_stress_psi: f64,
    pub axial_stress_psi: f64,
    pub bending_stress_psi: f64,
    pub von_mises_stress_psi: f64,
    pub cycles_to_failure: u64,
    pub fatigue_increment: f64,
    pub accumulated_fatigue_percent: f64,
    pub corrosion_factor: f64,
    pub weld_factor: f64,
    pub temperature_factor: f64,
    pub calculation_method: String,
    pub notes: String,
}

impl FatigueLogRecord {
    pub fn from_update(
        tenant_id: Uuid,
        reel_id: Uuid,
        job_id: Option<Uuid>,
        timestamp: DateTime<Utc>,
        update: &FatigueUpdate,
    ) -> Self {
        Self {
            tenant_id,
            reel_id,
            job_id,
            timestamp,
            cycle_number: update.total_cycles,
            pressure_psi: update.pressure_psi,
            tension_lbf: update.tension_lbf,
            bend_radius_in: update.bend_radius_in,
            temperature_f: update.temperature_f,
            hoop_stress_psi: update.stresses.hoop_psi,
            axial_stress_psi: update.stresses.axial_psi,
            bending_stress_psi: update.stresses.bending_psi,
            von_mises_stress_psi: update.stresses.von_mises_psi,
            cycles_to_failure: update.cycles_to_failure,
            fatigue_increment: update.fatigue_increment,
            accumulated_fatigue_percent: update.accumulated_fatigue_percent,
            corrosion_factor: update.factors.corrosion,
            weld_factor: update.factors.weld,
            temperature_factor: update.factors.temperature,
            calculation_method: update.method.clone(),
            notes: update.notes.clone(),
        }
    }
}
