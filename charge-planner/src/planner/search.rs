//! Greedy forward scan for one objective.
//!
//! State is the vehicle's progress along the route and the energy on
//! board. At each step the destination is tried first; otherwise the
//! objective's policy picks one reachable station and a charge level, and
//! the scan moves on from there.

use tracing::{debug, trace};

use crate::candidates::CandidateIndex;
use crate::domain::{DomainError, Soc, TripParameters, VehicleProfile};

use super::config::PlannerConfig;
use super::policy::{Objective, REACH_EPS_KWH, StopPolicy};
use super::result::{ChargingStop, Infeasibility, PlanResult, StopWarning};

/// Error from planning.
///
/// Only malformed input is an error. A trip that cannot be completed is a
/// normal [`PlanResult`] with `success == false`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// Trip parameters failed validation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Planner configuration is unusable
    #[error("invalid planner configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Stop planner over a prepared candidate index.
pub struct Planner<'a> {
    index: &'a CandidateIndex,
    vehicle: &'a VehicleProfile,
    config: &'a PlannerConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(index: &'a CandidateIndex, vehicle: &'a VehicleProfile, config: &'a PlannerConfig) -> Self {
        Self {
            index,
            vehicle,
            config,
        }
    }

    /// Plan charging stops for `trip` under `objective`.
    ///
    /// # Errors
    ///
    /// Returns `Err` only for invalid trip parameters or configuration.
    pub fn plan(&self, trip: &TripParameters, objective: Objective) -> Result<PlanResult, PlanError> {
        self.validate(trip)?;
        Ok(self.run(trip, objective))
    }

    pub(super) fn validate(&self, trip: &TripParameters) -> Result<(), PlanError> {
        trip.validate()?;
        self.config.validate().map_err(PlanError::InvalidConfig)?;
        Ok(())
    }

    /// Plan without validating; callers have already checked the inputs.
    pub(super) fn run(&self, trip: &TripParameters, objective: Objective) -> PlanResult {
        let policy = StopPolicy::new(self.index, self.vehicle, self.config, trip);
        let route = self.index.route();
        let destination_km = route.distance_km();
        let capacity = self.vehicle.battery_kwh();

        let mut progress_km = 0.0;
        let mut energy_kwh = trip.start_soc.energy_kwh(capacity);
        let mut next_candidate = 0;
        let mut stops: Vec<ChargingStop> = Vec::new();
        let mut distance_km = 0.0;
        let mut drive_min = 0.0;

        loop {
            let to_destination = route.energy_between(progress_km, destination_km, policy.ctx());
            if to_destination <= energy_kwh - policy.reserve_kwh() + REACH_EPS_KWH {
                let final_leg = destination_km - progress_km;
                distance_km += final_leg;
                drive_min += route.drive_minutes(final_leg);
                let arrival = Soc::from_energy(energy_kwh - to_destination, capacity);
                let plan = PlanResult::completed(objective, stops, distance_km, drive_min, arrival);

                debug!(
                    objective = %objective,
                    stops = plan.stop_count(),
                    arrival_soc = arrival.percent(),
                    total = ?plan.total_duration(),
                    charging = ?plan.charging_duration(),
                    warnings = plan.warnings.len(),
                    "Plan complete"
                );
                return plan;
            }

            if stops.len() >= self.config.max_stops {
                debug!(objective = %objective, max_stops = self.config.max_stops, "Stop limit reached");
                return PlanResult::infeasible(objective, Infeasibility::StopLimitExceeded);
            }

            let options = policy.reachable(next_candidate, progress_km, energy_kwh);
            trace!(
                objective = %objective,
                progress_km,
                energy_kwh,
                options = options.len(),
                "Scanning reachable stations"
            );

            let Some(decision) = policy.decide(objective, &options) else {
                debug!(
                    objective = %objective,
                    progress_km,
                    stops = stops.len(),
                    "No usable station in range"
                );
                return PlanResult::infeasible(objective, Infeasibility::Unreachable);
            };

            let candidate = decision.option.candidate;
            let leg_km = (candidate.progress_km - progress_km) + candidate.detour_km();
            distance_km += leg_km;
            drive_min += route.drive_minutes(leg_km);

            let stop = ChargingStop {
                station: candidate.station.clone(),
                progress_km: candidate.progress_km,
                arrival_soc: decision.arrival_soc,
                departure_soc: decision.departure_soc,
                charging_min: decision.session.minutes,
                energy_added_kwh: decision.session.energy_kwh,
                cost: decision.session.energy_kwh * candidate.price_per_kwh,
                price_per_kwh: candidate.price_per_kwh,
                distance_from_prev_km: leg_km,
                avg_power_kw: decision.session.avg_power_kw,
                peak_power_kw: decision.session.peak_power_kw,
                temperature_c: trip.conditions.temperature_c,
                warnings: StopWarning::for_stop(&candidate.station, self.vehicle, trip.conditions.temperature_c),
            };
            debug!(
                objective = %objective,
                station = %stop.station.id,
                progress_km = stop.progress_km,
                arrival_soc = stop.arrival_soc.percent(),
                departure_soc = stop.departure_soc.percent(),
                charging = ?stop.charging_duration(),
                warnings = ?stop.warnings,
                "Charging stop"
            );
            stops.push(stop);

            energy_kwh = decision.departure_soc.energy_kwh(capacity);
            progress_km = candidate.progress_km;
            next_candidate = decision.option.index + 1;
        }
    }
}
