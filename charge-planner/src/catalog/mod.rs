//! Vehicle catalog.
//!
//! Profiles keyed by id, with a case-insensitive make/model lookup for
//! callers that only know what the driver picked from a list. A default
//! catalog with common models ships with the crate.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::{ChargingCurve, VehicleProfile};

/// A collection of vehicle profiles.
#[derive(Debug, Clone, Default)]
pub struct VehicleCatalog {
    vehicles: BTreeMap<String, VehicleProfile>,
}

impl VehicleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile, replacing any with the same id.
    pub fn add(&mut self, profile: VehicleProfile) {
        self.vehicles.insert(profile.id().to_string(), profile);
    }

    /// Look up a profile by id.
    pub fn get(&self, id: &str) -> Option<&VehicleProfile> {
        self.vehicles.get(id)
    }

    /// Look up a profile by make and model, ignoring case.
    pub fn find(&self, make: &str, model: &str) -> Option<&VehicleProfile> {
        self.vehicles
            .values()
            .find(|v| v.make().eq_ignore_ascii_case(make) && v.model().eq_ignore_ascii_case(model))
    }

    /// All ids, in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.vehicles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleProfile> {
        self.vehicles.values()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

/// Builder for creating a catalog.
///
/// Specs that fail validation are logged and left out.
#[derive(Debug, Default)]
pub struct VehicleCatalogBuilder {
    inner: VehicleCatalog,
    connectors: Vec<String>,
}

impl VehicleCatalogBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Charging inlets given to every vehicle added after this call.
    pub fn connectors(mut self, connectors: &[&str]) -> Self {
        self.connectors = connectors.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a ready-made profile.
    pub fn profile(mut self, profile: VehicleProfile) -> Self {
        self.inner.add(profile);
        self
    }

    /// Add a vehicle with a typical taper for its DC peak.
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        mut self,
        id: &str,
        make: &str,
        model: &str,
        battery_kwh: f64,
        range_km: f64,
        max_dc_kw: f64,
        max_ac_kw: f64,
    ) -> Self {
        let profile = ChargingCurve::typical(max_dc_kw)
            .and_then(|curve| VehicleProfile::new(id, make, model, battery_kwh, range_km, max_dc_kw, curve))
            .and_then(|profile| profile.with_max_ac_kw(max_ac_kw))
            .map(|profile| profile.with_connectors(self.connectors.iter().cloned()));
        match profile {
            Ok(profile) => self.inner.add(profile),
            Err(error) => warn!(id, %error, "Skipping invalid catalog vehicle"),
        }
        self
    }

    /// Build the catalog.
    pub fn build(self) -> VehicleCatalog {
        self.inner
    }
}

/// Create the default catalog.
///
/// # Example
///
/// ```
/// use charge_planner::catalog::default_catalog;
///
/// let catalog = default_catalog();
/// let model_y = catalog.find("tesla", "model y").unwrap();
/// assert_eq!(model_y.id(), "tesla-model-y");
/// assert_eq!(model_y.battery_kwh(), 75.0);
/// ```
pub fn default_catalog() -> VehicleCatalog {
    VehicleCatalogBuilder::new()
        .connectors(&["CCS Type 2", "Type 2"])
        .add("togg-t10x", "TOGG", "T10X", 88.5, 523.0, 150.0, 11.0)
        .add("tesla-model-3", "Tesla", "Model 3", 60.0, 491.0, 170.0, 11.0)
        .add("tesla-model-y", "Tesla", "Model Y", 75.0, 533.0, 250.0, 11.0)
        .add("bmw-i4", "BMW", "i4 eDrive40", 83.9, 590.0, 200.0, 11.0)
        .add("bmw-ix3", "BMW", "iX3", 80.0, 460.0, 150.0, 11.0)
        .add("mercedes-eqe", "Mercedes", "EQE 350", 90.0, 654.0, 170.0, 22.0)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_contents() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 6);
        assert!(!catalog.is_empty());

        let togg = catalog.get("togg-t10x").unwrap();
        assert_eq!(togg.make(), "TOGG");
        assert_eq!(togg.max_dc_kw(), 150.0);
        assert_eq!(togg.max_ac_kw(), Some(11.0));
        assert_eq!(togg.curve().peak_kw(), 150.0);
        assert_eq!(togg.connectors(), ["CCS Type 2".to_string(), "Type 2".to_string()]);
    }

    #[test]
    fn find_ignores_case() {
        let catalog = default_catalog();
        assert_eq!(catalog.find("BMW", "IX3").map(|v| v.id()), Some("bmw-ix3"));
        assert!(catalog.find("BMW", "i3").is_none());
    }

    #[test]
    fn ids_are_sorted() {
        let catalog = default_catalog();
        let ids: Vec<_> = catalog.ids().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn builder_skips_invalid() {
        let catalog = VehicleCatalogBuilder::new()
            .add("ok", "Make", "Ok", 60.0, 400.0, 100.0, 11.0)
            .add("bad", "Make", "Bad", 0.0, 400.0, 100.0, 11.0)
            .add("bad-ac", "Make", "BadAc", 60.0, 400.0, 100.0, -1.0)
            .build();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("bad").is_none());
        assert!(catalog.get("ok").unwrap().connectors().is_empty());
    }

    #[test]
    fn builder_connectors_apply_to_later_vehicles() {
        let catalog = VehicleCatalogBuilder::new()
            .add("before", "Make", "Before", 60.0, 400.0, 100.0, 11.0)
            .connectors(&["CHAdeMO"])
            .add("after", "Make", "After", 60.0, 400.0, 50.0, 6.6)
            .build();
        assert!(catalog.get("before").unwrap().connectors().is_empty());
        assert_eq!(catalog.get("after").unwrap().connectors(), ["CHAdeMO".to_string()]);
    }

    #[test]
    fn add_replaces_same_id() {
        let mut catalog = default_catalog();
        let curve = ChargingCurve::flat(50.0).unwrap();
        catalog.add(VehicleProfile::new("bmw-i4", "BMW", "i4", 50.0, 300.0, 50.0, curve).unwrap());
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.get("bmw-i4").unwrap().battery_kwh(), 50.0);
    }
}
