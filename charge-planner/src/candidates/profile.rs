//! Distance, time and energy along a route.

use crate::domain::{LatLng, RouteGeometry};
use crate::energy::EnergyContext;

/// A route resolved into cumulative progress.
///
/// Progress is haversine distance along the polyline, rescaled so the last
/// point sits at the provider's total distance. Elevation between points
/// is linear.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteProfile {
    points: Vec<LatLng>,
    progress_km: Vec<f64>,
    elevations_m: Option<Vec<f64>>,
    distance_km: f64,
    duration_min: f64,
}

impl RouteProfile {
    pub fn new(route: &RouteGeometry) -> Self {
        let points = route.points().to_vec();
        let distance_km = route.distance_km();

        let mut raw = Vec::with_capacity(points.len());
        let mut total = 0.0;
        raw.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance_km(&pair[1]);
            raw.push(total);
        }

        let last = (points.len() - 1).max(1) as f64;
        let progress_km = if total > 0.0 {
            raw.iter().map(|d| d / total * distance_km).collect()
        } else {
            // Every point coincides; spread progress evenly
            (0..points.len()).map(|i| i as f64 / last * distance_km).collect()
        };

        Self {
            points,
            progress_km,
            elevations_m: route.elevations_m().map(<[f64]>::to_vec),
            distance_km,
            duration_min: route.duration_min(),
        }
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Progress of each polyline point (km).
    pub fn point_progress(&self) -> &[f64] {
        &self.progress_km
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    /// Progress of the point a fraction `t` along polyline segment `segment`.
    pub fn progress_on_segment(&self, segment: usize, t: f64) -> f64 {
        let start = self.progress_km[segment];
        let end = self.progress_km.get(segment + 1).copied().unwrap_or(start);
        start + t * (end - start)
    }

    /// Nominal driving time for `distance_km` at the route's average speed.
    pub fn drive_minutes(&self, distance_km: f64) -> f64 {
        distance_km.max(0.0) / self.distance_km * self.duration_min
    }

    /// Elevation at `progress_km` (m); zero on routes without elevation.
    pub fn elevation_at(&self, progress_km: f64) -> f64 {
        let Some(elevations) = &self.elevations_m else {
            return 0.0;
        };

        let idx = self.progress_km.partition_point(|p| *p <= progress_km);
        if idx == 0 {
            return elevations[0];
        }
        if idx >= self.progress_km.len() {
            return elevations[elevations.len() - 1];
        }

        let (p0, p1) = (self.progress_km[idx - 1], self.progress_km[idx]);
        let (e0, e1) = (elevations[idx - 1], elevations[idx]);
        if p1 <= p0 {
            return e1;
        }
        e0 + (progress_km - p0) / (p1 - p0) * (e1 - e0)
    }

    /// Split `[from_km, to_km]` at every polyline point inside it.
    fn pieces(&self, from_km: f64, to_km: f64) -> Vec<(f64, f64)> {
        let inner_start = self.progress_km.partition_point(|p| *p <= from_km);
        let inner_end = self.progress_km.partition_point(|p| *p < to_km).max(inner_start);

        let mut cuts = Vec::with_capacity(inner_end - inner_start + 2);
        cuts.push(from_km);
        cuts.extend_from_slice(&self.progress_km[inner_start..inner_end]);
        cuts.push(to_km);
        cuts.windows(2).map(|w| (w[0], w[1])).collect()
    }

    fn piece_energy(&self, from_km: f64, to_km: f64, ctx: &EnergyContext<'_>) -> f64 {
        let dh = self.elevation_at(to_km) - self.elevation_at(from_km);
        ctx.segment(to_km - from_km, dh)
    }

    /// Energy to drive from `from_km` to `to_km` (kWh).
    ///
    /// Zero if `to_km` is not ahead of `from_km`.
    pub fn energy_between(&self, from_km: f64, to_km: f64, ctx: &EnergyContext<'_>) -> f64 {
        if to_km <= from_km {
            return 0.0;
        }
        self.pieces(from_km, to_km)
            .into_iter()
            .map(|(a, b)| self.piece_energy(a, b, ctx))
            .sum()
    }

    /// Farthest progress reachable from `from_km` on `budget_kwh`.
    ///
    /// Energy within a piece grows linearly with distance, so the final
    /// piece is cut proportionally. Never beyond the end of the route.
    pub fn max_reach(&self, from_km: f64, budget_kwh: f64, ctx: &EnergyContext<'_>) -> f64 {
        if budget_kwh < 0.0 {
            return from_km;
        }

        let mut used = 0.0;
        for (a, b) in self.pieces(from_km, self.distance_km) {
            let energy = self.piece_energy(a, b, ctx);
            if used + energy <= budget_kwh {
                used += energy;
                continue;
            }
            let fraction = (budget_kwh - used) / energy;
            return a + fraction * (b - a);
        }
        self.distance_km.max(from_km)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{ChargingCurve, DrivingConditions, VehicleProfile};
    use crate::energy::ConsumptionModel;
    use proptest::prelude::*;

    proptest! {
        /// Driving to the reach limit never costs more than the budget
        #[test]
        fn reach_within_budget(
            elevations in proptest::collection::vec(0.0f64..1500.0, 6),
            from in 0.0f64..500.0,
            budget in 0.0f64..80.0,
        ) {
            let points = (0..6).map(|i| LatLng::new(i as f64 * 0.5, 0.0)).collect();
            let route = RouteGeometry::new(points, 550.0, 400.0).unwrap().with_elevations(elevations).unwrap();
            let profile = RouteProfile::new(&route);
            let model = ConsumptionModel::default();
            let vehicle = VehicleProfile::new("ev", "M", "X", 75.0, 480.0, 150.0, ChargingCurve::flat(150.0).unwrap()).unwrap();
            let ctx = EnergyContext::new(&model, &vehicle, DrivingConditions::default());

            let reach = profile.max_reach(from, budget, &ctx);
            prop_assert!(reach >= from);
            prop_assert!(reach <= 550.0 + 1e-9);
            prop_assert!(profile.energy_between(from, reach, &ctx) <= budget + 1e-6);
        }
    }
}
