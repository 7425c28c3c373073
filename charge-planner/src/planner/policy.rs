//! Objective policies.
//!
//! Each objective answers two questions at every leg: which reachable
//! station to stop at, and what to charge to before leaving it.
//!
//! - `fewest` stops at the farthest station and fills to the departure cap.
//! - `fastest` prefers the farthest fast charger and stays below the taper
//!   unless finishing, or a one-stop look-ahead, says otherwise.
//! - `cheapest` stops where energy is cheapest and buys only what it needs
//!   to reach somewhere cheaper still.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::candidates::{Candidate, CandidateIndex};
use crate::domain::{Soc, TripParameters, VehicleProfile};
use crate::energy::{ChargeSession, EnergyContext, charge_session};

use super::PlannerConfig;

/// Slack when comparing energy against a budget (kWh).
pub(super) const REACH_EPS_KWH: f64 = 1e-9;

/// Slack when pre-filtering by reach distance (km).
const REACH_SLACK_KM: f64 = 1e-6;

/// Smallest top-up worth a stop (%).
const SOC_EPS: f64 = 1e-9;

/// What a plan optimizes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Least total trip time
    Fastest,
    /// Fewest charging stops
    Fewest,
    /// Least money spent charging
    Cheapest,
}

impl Objective {
    pub const ALL: [Objective; 3] = [Objective::Fastest, Objective::Fewest, Objective::Cheapest];

    pub fn as_str(self) -> &'static str {
        match self {
            Objective::Fastest => "fastest",
            Objective::Fewest => "fewest",
            Objective::Cheapest => "cheapest",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate the vehicle can reach from where it is.
#[derive(Debug, Clone, Copy)]
pub(super) struct Reachable<'a> {
    /// Position in the candidate index
    pub index: usize,
    pub candidate: &'a Candidate,
    pub arrival_energy_kwh: f64,
}

/// A stop the policy has committed to.
#[derive(Debug, Clone, Copy)]
pub(super) struct StopDecision<'a> {
    pub option: Reachable<'a>,
    pub arrival_soc: Soc,
    pub departure_soc: Soc,
    pub session: ChargeSession,
}

/// Everything a policy needs to judge one trip.
pub(super) struct StopPolicy<'a> {
    index: &'a CandidateIndex,
    vehicle: &'a VehicleProfile,
    config: &'a PlannerConfig,
    ctx: EnergyContext<'a>,
    reserve_kwh: f64,
    target: Soc,
}

impl<'a> StopPolicy<'a> {
    pub fn new(
        index: &'a CandidateIndex,
        vehicle: &'a VehicleProfile,
        config: &'a PlannerConfig,
        trip: &TripParameters,
    ) -> Self {
        Self {
            index,
            vehicle,
            config,
            ctx: EnergyContext::new(&config.consumption, vehicle, trip.conditions),
            reserve_kwh: trip.min_arrival_soc.energy_kwh(vehicle.battery_kwh()),
            target: config.effective_target(trip),
        }
    }

    pub fn ctx(&self) -> &EnergyContext<'a> {
        &self.ctx
    }

    pub fn reserve_kwh(&self) -> f64 {
        self.reserve_kwh
    }

    fn cap(&self) -> Soc {
        self.config.max_departure_soc
    }

    /// Candidates from `start` on that can be reached from `progress_km`
    /// with `energy_kwh` on board, keeping the reserve.
    ///
    /// Arriving with exactly the reserve counts as reachable.
    pub fn reachable(&self, start: usize, progress_km: f64, energy_kwh: f64) -> Vec<Reachable<'a>> {
        let budget = energy_kwh - self.reserve_kwh;
        if budget < -REACH_EPS_KWH {
            return Vec::new();
        }

        let route = self.index.route();
        let horizon = route.max_reach(progress_km, budget.max(0.0), &self.ctx) + REACH_SLACK_KM;
        let candidates: &'a [Candidate] = self.index.candidates();

        candidates
            .iter()
            .enumerate()
            .skip(start)
            .take_while(|(_, c)| c.progress_km <= horizon)
            .filter_map(|(index, candidate)| {
                let leg = route.energy_between(progress_km, candidate.progress_km, &self.ctx)
                    + self.ctx.segment(candidate.detour_km(), 0.0);
                (leg <= budget + REACH_EPS_KWH).then_some(Reachable {
                    index,
                    candidate,
                    arrival_energy_kwh: energy_kwh - leg,
                })
            })
            .collect()
    }

    /// Pick a stop among `options` (ordered by progress) for `objective`.
    pub fn decide(&self, objective: Objective, options: &[Reachable<'a>]) -> Option<StopDecision<'a>> {
        match objective {
            Objective::Fewest => self.fewest(options),
            Objective::Fastest => self.fastest(options),
            Objective::Cheapest => self.cheapest(options),
        }
    }

    /// Charge needed at `candidate` to reach the destination with the reserve.
    fn finish_soc(&self, candidate: &Candidate) -> Soc {
        let route = self.index.route();
        let needed = route.energy_between(candidate.progress_km, route.distance_km(), &self.ctx) + self.reserve_kwh;
        Soc::from_energy(needed, self.vehicle.battery_kwh())
    }

    fn effective_kw(&self, candidate: &Candidate) -> f64 {
        self.vehicle
            .station_limit_kw(candidate.station.power_kw, candidate.station.power_type)
    }

    /// Charge at `option` up to `desired`, never past the departure cap.
    ///
    /// `None` if that adds no charge or the station cannot deliver it.
    fn charge_to(&self, option: &Reachable<'a>, desired: Soc) -> Option<StopDecision<'a>> {
        let arrival = Soc::from_energy(option.arrival_energy_kwh, self.vehicle.battery_kwh());
        let departure = desired.min(self.cap());
        if departure.percent() <= arrival.percent() + SOC_EPS {
            return None;
        }

        let session = charge_session(arrival, departure, self.effective_kw(option.candidate), self.vehicle)?;
        Some(StopDecision {
            option: *option,
            arrival_soc: arrival,
            departure_soc: departure,
            session,
        })
    }

    fn fewest(&self, options: &[Reachable<'a>]) -> Option<StopDecision<'a>> {
        options
            .iter()
            .rev()
            .find_map(|o| self.charge_to(o, self.finish_soc(o.candidate)))
    }

    fn fastest(&self, options: &[Reachable<'a>]) -> Option<StopDecision<'a>> {
        let threshold = self.config.fast_charge_threshold_kw;
        let (fast, slow): (Vec<&Reachable<'a>>, Vec<&Reachable<'a>>) = options
            .iter()
            .partition(|o| self.effective_kw(o.candidate) >= threshold);

        fast.into_iter()
            .rev()
            .chain(slow.into_iter().rev())
            .find_map(|o| self.fastest_at(o))
    }

    fn fastest_at(&self, option: &Reachable<'a>) -> Option<StopDecision<'a>> {
        let finish = self.finish_soc(option.candidate);
        if finish <= self.target {
            return self.charge_to(option, finish);
        }

        if finish <= self.cap() {
            let now = self.charge_to(option, finish);
            let partial = self.charge_to(option, self.target);
            return match (now, partial) {
                (Some(now), Some(partial)) => match self.split_minutes(option, &partial) {
                    Some(split) if split < now.session.minutes => {
                        trace!(
                            station = %option.candidate.station.id,
                            finish_min = now.session.minutes,
                            split_min = split,
                            "Two shorter stops beat one long charge"
                        );
                        Some(partial)
                    }
                    _ => Some(now),
                },
                (now, partial) => now.or(partial),
            };
        }

        // Another stop is needed whatever happens here
        if let Some(partial) = self.charge_to(option, self.target) {
            let departure_kwh = partial.departure_soc.energy_kwh(self.vehicle.battery_kwh());
            if !self.reachable(option.index + 1, option.candidate.progress_km, departure_kwh).is_empty() {
                return Some(partial);
            }
        }
        self.charge_to(option, self.cap())
    }

    /// Charging minutes for stopping at `option` with `first`, then once
    /// more to finish, penalty and extra detour driving included.
    fn split_minutes(&self, option: &Reachable<'a>, first: &StopDecision<'a>) -> Option<f64> {
        let route = self.index.route();
        let departure_kwh = first.departure_soc.energy_kwh(self.vehicle.battery_kwh());

        self.reachable(option.index + 1, option.candidate.progress_km, departure_kwh)
            .iter()
            .filter_map(|next| {
                let finish = self.finish_soc(next.candidate);
                if finish > self.cap() {
                    return None;
                }
                let second = self.charge_to(next, finish)?;
                Some(
                    second.session.minutes
                        + self.config.stop_penalty_min
                        + route.drive_minutes(next.candidate.detour_km()),
                )
            })
            .min_by(f64::total_cmp)
            .map(|second| first.session.minutes + second)
    }

    fn cheapest(&self, options: &[Reachable<'a>]) -> Option<StopDecision<'a>> {
        let mut ordered: Vec<&Reachable<'a>> = options.iter().collect();
        ordered.sort_by(|a, b| {
            a.candidate
                .price_per_kwh
                .total_cmp(&b.candidate.price_per_kwh)
                .then_with(|| b.candidate.progress_km.total_cmp(&a.candidate.progress_km))
        });
        ordered.into_iter().find_map(|o| self.cheapest_at(o))
    }

    fn cheapest_at(&self, option: &Reachable<'a>) -> Option<StopDecision<'a>> {
        let capacity = self.vehicle.battery_kwh();
        let finish = self.finish_soc(option.candidate);
        let full_kwh = self.cap().energy_kwh(capacity);
        let price = option.candidate.price_per_kwh;

        let cheaper = self
            .reachable(option.index + 1, option.candidate.progress_km, full_kwh)
            .into_iter()
            .find(|next| next.candidate.price_per_kwh < price);

        let desired = match cheaper {
            Some(next) => {
                let leg_kwh = full_kwh - next.arrival_energy_kwh;
                trace!(
                    station = %option.candidate.station.id,
                    cheaper = %next.candidate.station.id,
                    "Buying only enough to reach a cheaper station"
                );
                Soc::from_energy(leg_kwh + self.reserve_kwh, capacity).min(finish)
            }
            None => finish,
        };
        self.charge_to(option, desired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChargingCurve, LatLng, PowerType, RouteGeometry, Station};

    fn soc(p: f64) -> Soc {
        Soc::new(p).unwrap()
    }

    fn vehicle() -> VehicleProfile {
        VehicleProfile::new("ev", "M", "X", 75.0, 480.0, 150.0, ChargingCurve::flat(150.0).unwrap()).unwrap()
    }

    fn index(stations: &[(&str, f64, f64, f64)]) -> CandidateIndex {
        // (id, progress km, power kW, price)
        let route = RouteGeometry::new(vec![LatLng::new(0.0, 0.0), LatLng::new(6.0, 0.0)], 600.0, 400.0).unwrap();
        let candidates = stations
            .iter()
            .map(|(id, progress_km, kw, price)| Candidate {
                station: Station::new(*id, LatLng::new(0.0, 0.0), *kw, PowerType::Dc),
                progress_km: *progress_km,
                lateral_km: 0.0,
                price_per_kwh: *price,
            })
            .collect();
        CandidateIndex::from_candidates(&route, candidates)
    }

    #[test]
    fn objective_names() {
        assert_eq!(Objective::Fastest.to_string(), "fastest");
        assert_eq!(serde_json::to_string(&Objective::Cheapest).unwrap(), "\"cheapest\"");
        let parsed: Objective = serde_json::from_str("\"fewest\"").unwrap();
        assert_eq!(parsed, Objective::Fewest);
    }

    #[test]
    fn reachable_is_inclusive() {
        let index = index(&[("edge", 480.0, 150.0, 10.0), ("beyond", 481.0, 150.0, 10.0)]);
        let vehicle = vehicle();
        let config = PlannerConfig::default();
        let trip = TripParameters::new(Soc::FULL, Soc::EMPTY);
        let policy = StopPolicy::new(&index, &vehicle, &config, &trip);

        let options = policy.reachable(0, 0.0, 75.0);
        let ids: Vec<_> = options.iter().map(|o| o.candidate.station.id.as_str()).collect();
        assert_eq!(ids, vec!["edge"]);
        assert!(options[0].arrival_energy_kwh.abs() < 1e-9);
    }

    #[test]
    fn fewest_takes_farthest() {
        let index = index(&[("a", 100.0, 50.0, 10.0), ("b", 300.0, 50.0, 10.0)]);
        let vehicle = vehicle();
        let config = PlannerConfig::default();
        let trip = TripParameters::new(soc(80.0), soc(10.0));
        let policy = StopPolicy::new(&index, &vehicle, &config, &trip);

        let options = policy.reachable(0, 0.0, 60.0);
        let decision = policy.decide(Objective::Fewest, &options).unwrap();
        assert_eq!(decision.option.candidate.station.id, "b");
        // 300 km left needs 46.875 kWh plus 7.5 reserve: 72.5%
        assert!((decision.departure_soc.percent() - 72.5).abs() < 1e-9);
    }

    #[test]
    fn fewest_caps_departure() {
        let index = index(&[("a", 100.0, 50.0, 10.0)]);
        let vehicle = vehicle();
        let config = PlannerConfig::default();
        let trip = TripParameters::new(soc(40.0), soc(10.0));
        let policy = StopPolicy::new(&index, &vehicle, &config, &trip);

        let options = policy.reachable(0, 0.0, 30.0);
        let decision = policy.decide(Objective::Fewest, &options).unwrap();
        assert_eq!(decision.departure_soc, soc(90.0));
    }

    #[test]
    fn fastest_prefers_fast_chargers() {
        let index = index(&[("slow", 300.0, 50.0, 10.0), ("fast", 200.0, 150.0, 10.0)]);
        let vehicle = vehicle();
        let config = PlannerConfig::default();
        let trip = TripParameters::new(soc(80.0), soc(10.0));
        let policy = StopPolicy::new(&index, &vehicle, &config, &trip);

        let options = policy.reachable(0, 0.0, 60.0);
        let decision = policy.decide(Objective::Fastest, &options).unwrap();
        assert_eq!(decision.option.candidate.station.id, "fast");
    }

    #[test]
    fn fastest_falls_back_to_slow() {
        let index = index(&[("slow", 300.0, 50.0, 10.0)]);
        let vehicle = vehicle();
        let config = PlannerConfig::default();
        let trip = TripParameters::new(soc(80.0), soc(10.0));
        let policy = StopPolicy::new(&index, &vehicle, &config, &trip);

        let options = policy.reachable(0, 0.0, 60.0);
        let decision = policy.decide(Objective::Fastest, &options).unwrap();
        assert_eq!(decision.option.candidate.station.id, "slow");
    }

    #[test]
    fn cheapest_buys_only_to_next_cheaper() {
        let index = index(&[("pricey", 40.0, 150.0, 14.0), ("cheap", 300.0, 150.0, 8.0)]);
        let vehicle = vehicle();
        let config = PlannerConfig::default();
        // 20% start reaches only the first station
        let trip = TripParameters::new(soc(20.0), soc(10.0));
        let policy = StopPolicy::new(&index, &vehicle, &config, &trip);

        let options = policy.reachable(0, 0.0, 15.0);
        assert_eq!(options.len(), 1);
        let decision = policy.decide(Objective::Cheapest, &options).unwrap();
        assert_eq!(decision.option.candidate.station.id, "pricey");
        // 260 km to the cheap station is 40.625 kWh, plus 7.5 reserve
        assert!((decision.departure_soc.percent() - 48.125 / 75.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn cheapest_orders_by_price() {
        let index = index(&[("cheap", 100.0, 50.0, 8.0), ("pricey", 200.0, 150.0, 14.0)]);
        let vehicle = vehicle();
        let config = PlannerConfig::default();
        let trip = TripParameters::new(soc(60.0), soc(10.0));
        let policy = StopPolicy::new(&index, &vehicle, &config, &trip);

        let options = policy.reachable(0, 0.0, 45.0);
        assert_eq!(options.len(), 2);
        let decision = policy.decide(Objective::Cheapest, &options).unwrap();
        assert_eq!(decision.option.candidate.station.id, "cheap");
    }

    #[test]
    fn zero_power_station_skipped() {
        let index = index(&[("ok", 100.0, 50.0, 10.0), ("dead", 300.0, 0.0, 10.0)]);
        let vehicle = vehicle();
        let config = PlannerConfig::default();
        let trip = TripParameters::new(soc(80.0), soc(10.0));
        let policy = StopPolicy::new(&index, &vehicle, &config, &trip);

        let options = policy.reachable(0, 0.0, 60.0);
        for objective in Objective::ALL {
            let decision = policy.decide(objective, &options).unwrap();
            assert_eq!(decision.option.candidate.station.id, "ok");
        }
    }
}
