//! Plans and comparisons.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::{PowerType, Soc, Station, VehicleProfile};

use super::Objective;

/// Below this ambient temperature charging is expected to slow down (°C).
pub const COLD_CHARGING_BELOW_C: f64 = 5.0;

/// A station rated under this share of the vehicle's limit is flagged slow.
pub const SLOW_CHARGER_SHARE: f64 = 0.5;

/// Something the driver should know about a stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopWarning {
    /// Cold battery; charging may take longer than planned
    ColdCharging { temperature_c: f64 },
    /// Station delivers well under what the vehicle can take
    SlowCharger { station_kw: f64, vehicle_kw: f64 },
}

impl StopWarning {
    /// Warnings for charging `vehicle` at `station` in `temperature_c`.
    pub fn for_stop(station: &Station, vehicle: &VehicleProfile, temperature_c: f64) -> Vec<StopWarning> {
        let mut warnings = Vec::new();
        if temperature_c < COLD_CHARGING_BELOW_C {
            warnings.push(StopWarning::ColdCharging { temperature_c });
        }

        let vehicle_kw = match station.power_type {
            PowerType::Dc => Some(vehicle.max_dc_kw()),
            PowerType::Ac => vehicle.max_ac_kw(),
        };
        if let Some(vehicle_kw) = vehicle_kw
            && station.power_kw < vehicle_kw * SLOW_CHARGER_SHARE
        {
            warnings.push(StopWarning::SlowCharger {
                station_kw: station.power_kw,
                vehicle_kw,
            });
        }
        warnings
    }
}

/// One charging stop in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingStop {
    pub station: Station,
    /// Station position along the route (km)
    pub progress_km: f64,
    pub arrival_soc: Soc,
    pub departure_soc: Soc,
    pub charging_min: f64,
    pub energy_added_kwh: f64,
    pub cost: f64,
    pub price_per_kwh: f64,
    /// Driven since the previous stop or the origin, detour included (km)
    pub distance_from_prev_km: f64,
    pub avg_power_kw: f64,
    pub peak_power_kw: f64,
    /// Ambient temperature while charging (°C)
    pub temperature_c: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<StopWarning>,
}

impl ChargingStop {
    /// Returns the charging time as a Duration.
    pub fn charging_duration(&self) -> Duration {
        minutes_to_duration(self.charging_min)
    }
}

/// Why a plan failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Infeasibility {
    /// Neither the destination nor any usable station is in range
    Unreachable,
    /// The stop cap was hit before the destination came into range
    StopLimitExceeded,
    /// The planning task did not complete
    Aborted,
}

/// Outcome of planning one objective.
///
/// A failed plan carries no stops and zero totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub objective: Objective,
    pub success: bool,
    pub stops: Vec<ChargingStop>,
    pub total_distance_km: f64,
    pub total_drive_min: f64,
    pub total_charging_min: f64,
    pub total_cost: f64,
    pub total_energy_kwh: f64,
    /// State of charge at the destination; `None` on failure
    pub arrival_soc: Option<Soc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<Infeasibility>,
    /// Every distinct stop warning, in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<StopWarning>,
}

impl PlanResult {
    /// A failed plan.
    pub fn infeasible(objective: Objective, reason: Infeasibility) -> Self {
        Self {
            objective,
            success: false,
            stops: Vec::new(),
            total_distance_km: 0.0,
            total_drive_min: 0.0,
            total_charging_min: 0.0,
            total_cost: 0.0,
            total_energy_kwh: 0.0,
            arrival_soc: None,
            failure: Some(reason),
            warnings: Vec::new(),
        }
    }

    /// Build a successful plan from its stops and the driving totals.
    pub(crate) fn completed(
        objective: Objective,
        stops: Vec<ChargingStop>,
        total_distance_km: f64,
        total_drive_min: f64,
        arrival_soc: Soc,
    ) -> Self {
        let total_charging_min = stops.iter().map(|s| s.charging_min).sum();
        let total_cost = stops.iter().map(|s| s.cost).sum();
        let total_energy_kwh = stops.iter().map(|s| s.energy_added_kwh).sum();
        let mut warnings: Vec<StopWarning> = Vec::new();
        for warning in stops.iter().flat_map(|s| &s.warnings) {
            if !warnings.contains(warning) {
                warnings.push(*warning);
            }
        }
        Self {
            objective,
            success: true,
            stops,
            total_distance_km,
            total_drive_min,
            total_charging_min,
            total_cost,
            total_energy_kwh,
            arrival_soc: Some(arrival_soc),
            failure: None,
            warnings,
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Driving plus charging (minutes).
    pub fn total_trip_min(&self) -> f64 {
        self.total_drive_min + self.total_charging_min
    }

    /// Returns the total trip time as a Duration.
    pub fn total_duration(&self) -> Duration {
        minutes_to_duration(self.total_trip_min())
    }

    /// Returns the total charging time as a Duration.
    pub fn charging_duration(&self) -> Duration {
        minutes_to_duration(self.total_charging_min)
    }
}

/// One plan per objective, each computed independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub fastest: PlanResult,
    pub fewest: PlanResult,
    pub cheapest: PlanResult,
}

impl ComparisonResult {
    /// Assemble a comparison from plans in any order.
    ///
    /// Objectives without a plan are recorded as aborted.
    pub fn from_plans(plans: impl IntoIterator<Item = PlanResult>) -> Self {
        let mut fastest = None;
        let mut fewest = None;
        let mut cheapest = None;
        for plan in plans {
            match plan.objective {
                Objective::Fastest => fastest = Some(plan),
                Objective::Fewest => fewest = Some(plan),
                Objective::Cheapest => cheapest = Some(plan),
            }
        }
        let or_aborted = |plan: Option<PlanResult>, objective| {
            plan.unwrap_or_else(|| PlanResult::infeasible(objective, Infeasibility::Aborted))
        };
        Self {
            fastest: or_aborted(fastest, Objective::Fastest),
            fewest: or_aborted(fewest, Objective::Fewest),
            cheapest: or_aborted(cheapest, Objective::Cheapest),
        }
    }

    pub fn get(&self, objective: Objective) -> &PlanResult {
        match objective {
            Objective::Fastest => &self.fastest,
            Objective::Fewest => &self.fewest,
            Objective::Cheapest => &self.cheapest,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanResult> {
        [&self.fastest, &self.fewest, &self.cheapest].into_iter()
    }

    /// Objectives whose plan succeeded.
    pub fn successful(&self) -> Vec<Objective> {
        self.iter().filter(|p| p.success).map(|p| p.objective).collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.iter().all(|p| p.success)
    }
}

fn minutes_to_duration(minutes: f64) -> Duration {
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}
