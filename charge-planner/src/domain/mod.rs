//! Domain types for the charging stop planner.
//!
//! This module contains the validated inputs the planner works on:
//! vehicles, routes, stations, connectors and trip parameters. Types enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod connector;
mod error;
mod route;
mod soc;
mod station;
mod trip;
mod vehicle;

pub use connector::connectors_compatible;
pub use error::DomainError;
pub use route::{EARTH_RADIUS_KM, LatLng, RouteGeometry};
pub use soc::{InvalidSoc, Soc};
pub use station::{PowerType, Station};
pub use trip::{DrivingConditions, TripParameters};
pub use vehicle::{ChargingCurve, CurvePoint, DEFAULT_MASS_KG, VehicleProfile};
