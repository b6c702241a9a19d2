//! Reel state and pipe travel direction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::defaults;

use super::FatigueUpdate;

// ============================================================================
// Travel Direction
// ============================================================================

/// Direction the tubing is moving through the injector.
///
/// Moving pipe is bent over the gooseneck; stopped pipe sits on the reel core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelDirection {
    /// Running in hole
    In,
    /// Pulling out of hole
    Out,
    Stopped,
}

impl TravelDirection {
    /// Whether this direction counts as a bending cycle.
    pub fn is_moving(self) -> bool {
        !matches!(self, TravelDirection::Stopped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TravelDirection::In => "IN",
            TravelDirection::Out => "OUT",
            TravelDirection::Stopped => "STOPPED",
        }
    }
}

impl std::fmt::Display for TravelDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown travel direction '{0}' (expected IN, OUT or STOPPED)")]
pub struct ParseDirectionError(pub String);

impl std::str::FromStr for TravelDirection {
    type Err = ParseDirectionError;

    /// Case-insensitive; accepts the RIH/POOH shorthand used on trip sheets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" | "RIH" => Ok(TravelDirection::In),
            "OUT" | "POOH" => Ok(TravelDirection::Out),
            "STOPPED" | "STOP" => Ok(TravelDirection::Stopped),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

// ============================================================================
// Reel State
// ============================================================================

/// Persisted snapshot of one coiled-tubing reel.
///
/// Fatigue fields change only through [`ReelState::apply`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReelState {
    pub reel_id: Uuid,
    pub tenant_id: Uuid,
    /// Operator-facing identifier, unique per tenant.
    pub reel_code: String,

    pub tubing_od_in: f64,
    pub tubing_id_in: f64,
    pub total_length_ft: f64,
    pub material_grade: String,
    pub gooseneck_radius_in: f64,
    pub reel_core_diameter_in: f64,
    #[serde(default)]
    pub corrosion_environment: Option<String>,
    #[serde(default = "default_weld_factor")]
    pub weld_factor: f64,

    /// Cumulative Palmgren-Miner damage, 0..=100.
    #[serde(default)]
    pub accumulated_fatigue_percent: f64,
    #[serde(default)]
    pub total_cycles: u32,
    #[serde(default)]
    pub estimated_remaining_cycles: Option<u64>,
    #[serde(default)]
    pub fatigue_method: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

fn default_weld_factor() -> f64 {
    defaults::DEFAULT_WELD_FACTOR
}

impl ReelState {
    /// Curvature radius the pipe sees for a given direction (in).
    pub fn bend_radius_in(&self, direction: TravelDirection) -> f64 {
        match direction {
            TravelDirection::Stopped => self.reel_core_diameter_in / 2.0,
            TravelDirection::In | TravelDirection::Out => self.gooseneck_radius_in,
        }
    }

    /// Commit an accepted update. Fatigue and `last_updated` never go backwards.
    pub fn apply(&mut self, update: &FatigueUpdate, at: DateTime<Utc>) {
        self.accumulated_fatigue_percent = update
            .accumulated_fatigue_percent_raw
            .max(self.accumulated_fatigue_percent)
            .min(100.0);
        self.total_cycles = update.total_cycles;
        self.estimated_remaining_cycles = Some(update.estimated_remaining_cycles);
        self.fatigue_method = Some(update.method.clone());
        self.last_updated = self.last_updated.max(Some(at));
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Reel attributes supplied at registration; anything omitted takes the
/// standard 2-3/8" QT-800 string values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewReel {
    pub reel_code: String,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub tubing_od_in: Option<f64>,
    #[serde(default)]
    pub tubing_id_in: Option<f64>,
    #[serde(default)]
    pub total_length_ft: Option<f64>,
    #[serde(default)]
    pub material_grade: Option<String>,
    #[serde(default)]
    pub gooseneck_radius_in: Option<f64>,
    #[serde(default)]
    pub reel_core_diameter_in: Option<f64>,
    #[serde(default)]
    pub corrosion_environment: Option<String>,
    #[serde(default)]
    pub weld_factor: Option<f64>,
}

impl NewReel {
    pub fn new(reel_code: impl Into<String>) -> Self {
        Self {
            reel_code: reel_code.into(),
            ..Self::default()
        }
    }

    /// Build a fresh reel with zero fatigue and a new id.
    pub fn into_state(self, default_tenant: Uuid) -> ReelState {
        ReelState {
            reel_id: Uuid::new_v4(),
            tenant_id: self.tenant_id.unwrap_or(default_tenant),
            reel_code: self.reel_code,
            tubing_od_in: self.tubing_od_in.unwrap_or(defaults::DEFAULT_TUBING_OD_IN),
            tubing_id_in: self.tubing_id_in.unwrap_or(defaults::DEFAULT_TUBING_ID_IN),
            total_length_ft: self.total_length_ft.unwrap_or(defaults::DEFAULT_TUBING_LENGTH_FT),
            material_grade: self
                .material_grade
                .unwrap_or_else(|| defaults::DEFAULT_MATERIAL_GRADE.to_string()),
            gooseneck_radius_in: self
                .gooseneck_radius_in
                .unwrap_or(defaults::DEFAULT_GOOSENECK_RADIUS_IN),
            reel_core_diameter_in: self
                .reel_core_diameter_in
                .unwrap_or(defaults::DEFAULT_REEL_CORE_DIAMETER_IN),
            corrosion_environment: Some(
                self.corrosion_environment
                    .unwrap_or_else(|| defaults::DEFAULT_CORROSION_ENVIRONMENT.to_string()),
            ),
            weld_factor: self.weld_factor.unwrap_or(defaults::DEFAULT_WELD_FACTOR),
            accumulated_fatigue_percent: 0.0,
            total_cycles: 0,
            estimated_remaining_cycles: None,
            fatigue_method: None,
            last_updated: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse_aliases() {
        assert_eq!("in".parse::<TravelDirection>().unwrap(), TravelDirection::In);
        assert_eq!(" POOH ".parse::<TravelDirection>().unwrap(), TravelDirection::Out);
        assert_eq!("Stopped".parse::<TravelDirection>().unwrap(), TravelDirection::Stopped);
        assert!("sideways".parse::<TravelDirection>().is_err());
    }

    #[test]
    fn test_direction_serde_upper_case() {
        let json = serde_json::to_string(&TravelDirection::Stopped).unwrap();
        assert_eq!(json, "\"STOPPED\"");
        let back: TravelDirection = serde_json::from_str("\"OUT\"").unwrap();
        assert_eq!(back, TravelDirection::Out);
    }

    #[test]
    fn test_registration_defaults() {
        let tenant = Uuid::new_v4();
        let reel = NewReel::new("R-101").into_state(tenant);
        assert_eq!(reel.tenant_id, tenant);
        assert!((reel.tubing_od_in - 2.375).abs() < 1e-12);
        assert!((reel.tubing_id_in - 1.995).abs() < 1e-12);
        assert_eq!(reel.material_grade, "QT-800");
        assert_eq!(reel.corrosion_environment.as_deref(), Some("SWEET"));
        assert_eq!(reel.total_cycles, 0);
        assert!((reel.bend_radius_in(TravelDirection::In) - 72.0).abs() < 1e-12);
        assert!((reel.bend_radius_in(TravelDirection::Stopped) - 48.0).abs() < 1e-12);
    }

    #[test]
    fn test_apply_keeps_latest_timestamp() {
        use chrono::TimeZone;
        use crate::physics_engine::FatigueAccumulator;
        use crate::types::TelemetrySample;

        let mut reel = NewReel::new("R-102").into_state(Uuid::new_v4());
        reel.gooseneck_radius_in = 1e6;
        let sample = TelemetrySample::new(2000.0, 0.0, TravelDirection::In);
        let update = FatigueAccumulator::default()
            .calculate(&sample, &reel)
            .unwrap()
            .update()
            .cloned()
            .unwrap();

        let late = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 6, 1, 11, 0, 0).unwrap();
        reel.apply(&update, late);
        reel.apply(&update, early);
        assert_eq!(reel.last_updated, Some(late));
    }
}
