//! Scenario files.
//!
//! A scenario bundles everything one comparison needs: the route and
//! station list already fetched from their providers, the vehicle, the
//! trip and, optionally, pricing and planner configuration overrides.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::candidates::CandidateIndex;
use crate::catalog::VehicleCatalog;
use crate::domain::{DomainError, RouteGeometry, Station, TripParameters, VehicleProfile};
use crate::planner::{ComparisonResult, PlanError, PlannerConfig, compare, compare_concurrent};
use crate::pricing::PricingTable;

/// Errors that can occur when loading or running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Scenario file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scenario is not valid JSON or fails validation while parsing
    #[error("invalid scenario: {0}")]
    Json(#[from] serde_json::Error),

    /// Vehicle is not in the catalog
    #[error("unknown vehicle: {0}")]
    UnknownVehicle(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// How a scenario names its vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VehicleSelection {
    /// A catalog entry by id
    Catalog { catalog_id: String },
    /// A full profile given inline
    Profile(VehicleProfile),
    /// A catalog entry by make and model
    Lookup { make: String, model: String },
}

/// One route, one vehicle, one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub route: RouteGeometry,
    #[serde(default)]
    pub stations: Vec<Station>,
    pub vehicle: VehicleSelection,
    pub trip: TripParameters,
    /// Overrides `config.lateral_tolerance_km`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lateral_tolerance_km: Option<f64>,
    #[serde(default)]
    pub pricing: PricingTable,
    #[serde(default)]
    pub config: PlannerConfig,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scenario from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_json(&contents)?;
        debug!(
            path = %path.display(),
            stations = scenario.stations.len(),
            "Loaded scenario"
        );
        Ok(scenario)
    }

    /// The vehicle profile, looking it up in `catalog` if needed.
    pub fn resolve_vehicle(&self, catalog: &VehicleCatalog) -> Result<VehicleProfile, ScenarioError> {
        let found = match &self.vehicle {
            VehicleSelection::Profile(profile) => return Ok(profile.clone()),
            VehicleSelection::Catalog { catalog_id } => catalog
                .get(catalog_id)
                .ok_or_else(|| ScenarioError::UnknownVehicle(catalog_id.clone())),
            VehicleSelection::Lookup { make, model } => catalog
                .find(make, model)
                .ok_or_else(|| ScenarioError::UnknownVehicle(format!("{make} {model}"))),
        };
        found.cloned()
    }

    pub fn lateral_tolerance_km(&self) -> f64 {
        self.lateral_tolerance_km
            .unwrap_or(self.config.lateral_tolerance_km)
    }

    /// Resolve the station list against the route for `vehicle`.
    pub fn build_index(&self, vehicle: &VehicleProfile) -> Result<CandidateIndex, ScenarioError> {
        Ok(CandidateIndex::build_for_vehicle(
            &self.route,
            &self.stations,
            self.lateral_tolerance_km(),
            &self.pricing,
            vehicle,
        )?)
    }

    /// Compare all three objectives.
    pub fn run(&self, catalog: &VehicleCatalog) -> Result<ComparisonResult, ScenarioError> {
        let vehicle = self.resolve_vehicle(catalog)?;
        let index = self.build_index(&vehicle)?;
        info!(
            vehicle = vehicle.id(),
            candidates = index.len(),
            distance_km = self.route.distance_km(),
            "Planning scenario"
        );
        Ok(compare(&index, &vehicle, &self.trip, &self.config)?)
    }

    /// Compare all three objectives with one planning task each.
    pub async fn run_concurrent(&self, catalog: &VehicleCatalog) -> Result<ComparisonResult, ScenarioError> {
        let vehicle = self.resolve_vehicle(catalog)?;
        let index = self.build_index(&vehicle)?;
        info!(
            vehicle = vehicle.id(),
            candidates = index.len(),
            distance_km = self.route.distance_km(),
            "Planning scenario"
        );
        let comparison = compare_concurrent(
            Arc::new(index),
            Arc::new(vehicle),
            self.trip,
            Arc::new(self.config.clone()),
        )
        .await?;
        Ok(comparison)
    }
}
