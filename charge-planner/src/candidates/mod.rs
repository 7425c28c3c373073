//! Station candidate index.
//!
//! Resolves a station list against a route once: every station within the
//! lateral tolerance of the polyline becomes a [`Candidate`] annotated with
//! its progress along the route, its detour and its price. The index is
//! then shared read-only by every strategy run.

mod geometry;
mod profile;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{DomainError, RouteGeometry, Station, VehicleProfile, connectors_compatible};
use crate::pricing::PricingTable;

pub use geometry::project_onto_segment;
pub use profile::RouteProfile;

/// A station on the route, as the planner sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub station: Station,
    /// Distance along the route to the station's nearest point (km)
    pub progress_km: f64,
    /// Distance from the route to the station (km)
    pub lateral_km: f64,
    pub price_per_kwh: f64,
}

impl Candidate {
    /// Extra driving to reach the station and return to the route (km).
    pub fn detour_km(&self) -> f64 {
        2.0 * self.lateral_km
    }
}

/// Resolve `stations` against `route`.
///
/// Stations farther than `lateral_tolerance_km` from the polyline are
/// dropped, as are stations none of whose connectors fit one of `inlets`
/// (an empty `inlets` accepts every station). The result is ordered by
/// progress, ties broken by station id.
///
/// # Errors
///
/// Returns `Err` if the tolerance is negative or not finite.
pub fn build_candidates(
    route: &RouteGeometry,
    stations: &[Station],
    lateral_tolerance_km: f64,
    pricing: &PricingTable,
    inlets: &[String],
) -> Result<Vec<Candidate>, DomainError> {
    let profile = RouteProfile::new(route);
    candidates_on(&profile, stations, lateral_tolerance_km, pricing, inlets)
}

fn candidates_on(
    profile: &RouteProfile,
    stations: &[Station],
    lateral_tolerance_km: f64,
    pricing: &PricingTable,
    inlets: &[String],
) -> Result<Vec<Candidate>, DomainError> {
    if !(lateral_tolerance_km.is_finite() && lateral_tolerance_km >= 0.0) {
        return Err(DomainError::InvalidTolerance);
    }

    let mut candidates = Vec::new();
    for station in stations {
        if !station.location.is_valid() || !station.power_kw.is_finite() {
            warn!(station = %station.id, "Skipping station with unusable location or power");
            continue;
        }
        if !connectors_compatible(inlets, &station.connectors) {
            debug!(station = %station.id, connectors = ?station.connectors, "Skipping station without a compatible connector");
            continue;
        }

        let Some((lateral_km, progress_km)) = nearest_on_route(profile, station) else {
            continue;
        };
        if lateral_km > lateral_tolerance_km {
            continue;
        }

        candidates.push(Candidate {
            price_per_kwh: pricing.price_for(station),
            station: station.clone(),
            progress_km,
            lateral_km,
        });
    }

    sort_candidates(&mut candidates);
    debug!(
        stations = stations.len(),
        candidates = candidates.len(),
        lateral_tolerance_km,
        "Built candidate list"
    );
    Ok(candidates)
}

/// Closest approach of a station to the polyline: (lateral km, progress km).
fn nearest_on_route(profile: &RouteProfile, station: &Station) -> Option<(f64, f64)> {
    let points = profile.points();
    let mut best: Option<(f64, f64)> = None;

    for (segment, pair) in points.windows(2).enumerate() {
        let (lateral, t) = project_onto_segment(station.location, pair[0], pair[1]);
        if best.is_none_or(|(best_lateral, _)| lateral < best_lateral) {
            best = Some((lateral, profile.progress_on_segment(segment, t)));
        }
    }
    best
}

fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        a.progress_km
            .total_cmp(&b.progress_km)
            .then_with(|| a.station.id.cmp(&b.station.id))
    });
}

/// Candidates for one route plus the route profile used to cost driving.
///
/// # Examples
///
/// ```
/// use charge_planner::candidates::CandidateIndex;
/// use charge_planner::domain::{LatLng, PowerType, RouteGeometry, Station};
/// use charge_planner::pricing::PricingTable;
///
/// let route = RouteGeometry::new(vec![LatLng::new(0.0, 0.0), LatLng::new(2.0, 0.0)], 222.0, 150.0).unwrap();
/// let stations = vec![
///     Station::new("near", LatLng::new(1.0, 0.01), 150.0, PowerType::Dc),
///     Station::new("far", LatLng::new(1.0, 1.0), 150.0, PowerType::Dc),
/// ];
///
/// let index = CandidateIndex::build(&route, &stations, 5.0, &PricingTable::default()).unwrap();
/// assert_eq!(index.len(), 1);
/// assert_eq!(index.candidates()[0].station.id, "near");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateIndex {
    profile: RouteProfile,
    candidates: Vec<Candidate>,
}

impl CandidateIndex {
    /// Project `stations` onto `route` and keep those within tolerance.
    pub fn build(
        route: &RouteGeometry,
        stations: &[Station],
        lateral_tolerance_km: f64,
        pricing: &PricingTable,
    ) -> Result<Self, DomainError> {
        let profile = RouteProfile::new(route);
        let candidates = candidates_on(&profile, stations, lateral_tolerance_km, pricing, &[])?;
        Ok(Self {
            profile,
            candidates,
        })
    }

    /// Like [`build`](Self::build), keeping only stations `vehicle` can plug into.
    pub fn build_for_vehicle(
        route: &RouteGeometry,
        stations: &[Station],
        lateral_tolerance_km: f64,
        pricing: &PricingTable,
        vehicle: &VehicleProfile,
    ) -> Result<Self, DomainError> {
        let profile = RouteProfile::new(route);
        let candidates = candidates_on(&profile, stations, lateral_tolerance_km, pricing, vehicle.connectors())?;
        Ok(Self {
            profile,
            candidates,
        })
    }

    /// Use candidates whose progress is already known.
    ///
    /// Candidates are re-sorted; ones with non-finite or off-route progress
    /// are dropped.
    pub fn from_candidates(route: &RouteGeometry, candidates: Vec<Candidate>) -> Self {
        let profile = RouteProfile::new(route);
        let distance = profile.distance_km();
        let mut candidates: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| {
                let usable = c.progress_km.is_finite()
                    && (0.0..=distance).contains(&c.progress_km)
                    && c.lateral_km.is_finite()
                    && c.lateral_km >= 0.0
                    && c.station.power_kw.is_finite()
                    && c.price_per_kwh.is_finite();
                if !usable {
                    warn!(station = %c.station.id, "Dropping candidate with unusable annotations");
                }
                usable
            })
            .collect();
        sort_candidates(&mut candidates);
        Self {
            profile,
            candidates,
        }
    }

    pub fn route(&self) -> &RouteProfile {
        &self.profile
    }

    /// All candidates, ordered by progress.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
