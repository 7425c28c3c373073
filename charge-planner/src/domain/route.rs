//! Route geometry as returned by a directions provider.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Mean Earth radius used for great-circle distances (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to `other` (km), by the haversine formula.
    pub fn distance_km(&self, other: &LatLng) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RouteRecord {
    points: Vec<LatLng>,
    distance_km: f64,
    duration_min: f64,
    #[serde(default)]
    elevations_m: Option<Vec<f64>>,
}

/// An immutable driving route.
///
/// The polyline, total distance and nominal duration come from the
/// directions provider. Elevation samples are optional; a route without
/// them is treated as flat.
///
/// # Examples
///
/// ```
/// use charge_planner::domain::{LatLng, RouteGeometry};
///
/// let route = RouteGeometry::new(
///     vec![LatLng::new(41.0, 29.0), LatLng::new(39.9, 32.8)],
///     450.0,
///     300.0,
/// )
/// .unwrap();
/// assert_eq!(route.avg_speed_kmh(), 90.0);
///
/// // A single point is not a route
/// assert!(RouteGeometry::new(vec![LatLng::new(41.0, 29.0)], 10.0, 10.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RouteRecord", into = "RouteRecord")]
pub struct RouteGeometry {
    points: Vec<LatLng>,
    distance_km: f64,
    duration_min: f64,
    elevations_m: Option<Vec<f64>>,
}

impl RouteGeometry {
    /// Create a route from provider output.
    pub fn new(points: Vec<LatLng>, distance_km: f64, duration_min: f64) -> Result<Self, DomainError> {
        if points.len() < 2 {
            return Err(DomainError::InvalidRoute("route needs at least two points"));
        }
        if !points.iter().all(LatLng::is_valid) {
            return Err(DomainError::InvalidRoute("route contains an invalid coordinate"));
        }
        if !(distance_km.is_finite() && distance_km > 0.0) {
            return Err(DomainError::InvalidRoute("distance must be positive"));
        }
        if !(duration_min.is_finite() && duration_min > 0.0) {
            return Err(DomainError::InvalidRoute("duration must be positive"));
        }

        Ok(Self {
            points,
            distance_km,
            duration_min,
            elevations_m: None,
        })
    }

    /// Attach one elevation sample (m) per point.
    pub fn with_elevations(mut self, elevations_m: Vec<f64>) -> Result<Self, DomainError> {
        if elevations_m.len() != self.points.len() {
            return Err(DomainError::InvalidRoute(
                "elevation samples must match route points",
            ));
        }
        if !elevations_m.iter().all(|e| e.is_finite()) {
            return Err(DomainError::InvalidRoute("elevation must be finite"));
        }
        self.elevations_m = Some(elevations_m);
        Ok(self)
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Total distance reported by the provider (km).
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Nominal driving duration reported by the provider (min).
    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn elevations_m(&self) -> Option<&[f64]> {
        self.elevations_m.as_deref()
    }

    /// Average speed implied by distance and duration (km/h).
    pub fn avg_speed_kmh(&self) -> f64 {
        self.distance_km / (self.duration_min / 60.0)
    }
}

impl TryFrom<RouteRecord> for RouteGeometry {
    type Error = DomainError;

    fn try_from(record: RouteRecord) -> Result<Self, Self::Error> {
        let route = RouteGeometry::new(record.points, record.distance_km, record.duration_min)?;
        match record.elevations_m {
            Some(elevations) => route.with_elevations(elevations),
            None => Ok(route),
        }
    }
}

impl From<RouteGeometry> for RouteRecord {
    fn from(route: RouteGeometry) -> Self {
        Self {
            points: route.points,
            distance_km: route.distance_km,
            duration_min: route.duration_min,
            elevations_m: route.elevations_m,
        }
    }
}
