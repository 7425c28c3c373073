//! Planner configuration.

use serde::{Deserialize, Serialize};

use crate::domain::{Soc, TripParameters};
use crate::energy::ConsumptionModel;

/// Configuration parameters for stop planning.
///
/// Every field has a default, so a scenario file only needs to name the
/// ones it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum number of charging stops before a plan is abandoned.
    pub max_stops: usize,

    /// Stations at or above this power count as fast chargers (kW).
    pub fast_charge_threshold_kw: f64,

    /// Top-up level used when the trip does not name one.
    pub default_target_soc: Soc,

    /// Highest level any strategy charges to.
    /// Also the cap on trip-supplied targets.
    pub max_departure_soc: Soc,

    /// Time added per extra stop when weighing one long charge against
    /// two shorter ones (minutes).
    pub stop_penalty_min: f64,

    /// Maximum distance from the route for a station to be used (km).
    pub lateral_tolerance_km: f64,

    /// Energy model for driving.
    pub consumption: ConsumptionModel,
}

impl PlannerConfig {
    /// Check the numeric fields are usable.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.fast_charge_threshold_kw.is_finite() && self.fast_charge_threshold_kw >= 0.0) {
            return Err("fast charge threshold must be finite and non-negative");
        }
        if !(self.stop_penalty_min.is_finite() && self.stop_penalty_min >= 0.0) {
            return Err("stop penalty must be finite and non-negative");
        }
        if !(self.lateral_tolerance_km.is_finite() && self.lateral_tolerance_km >= 0.0) {
            return Err("lateral tolerance must be finite and non-negative");
        }
        if !self.consumption.is_valid() {
            return Err("efficiencies must be between 0 and 1");
        }
        Ok(())
    }

    /// The level a strategy tops up to when it is not charging to finish.
    pub fn effective_target(&self, trip: &TripParameters) -> Soc {
        trip.target_soc
            .unwrap_or(self.default_target_soc)
            .min(self.max_departure_soc)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_stops: 5,
            fast_charge_threshold_kw: 100.0,
            default_target_soc: Soc::saturating(80.0),
            max_departure_soc: Soc::saturating(90.0),
            stop_penalty_min: 5.0,
            lateral_tolerance_km: 5.0,
            consumption: ConsumptionModel::default(),
        }
    }
}
