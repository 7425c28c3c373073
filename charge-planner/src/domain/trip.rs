//! Per-request trip parameters.

use serde::{Deserialize, Serialize};

use super::{DomainError, Soc};

/// Ambient conditions applied to every segment of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivingConditions {
    /// Outside temperature (°C)
    pub temperature_c: f64,
    /// Wind speed (km/h)
    pub wind_kmh: f64,
}

impl Default for DrivingConditions {
    fn default() -> Self {
        Self {
            temperature_c: 20.0,
            wind_kmh: 0.0,
        }
    }
}

/// What the driver starts with and what they are willing to arrive with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripParameters {
    /// Charge at departure from the origin
    pub start_soc: Soc,
    /// Reserve kept on arrival at every stop and at the destination
    pub min_arrival_soc: Soc,
    /// Preferred top-up level; the planner default applies when unset
    #[serde(default)]
    pub target_soc: Option<Soc>,
    #[serde(default)]
    pub conditions: DrivingConditions,
}

impl TripParameters {
    pub fn new(start_soc: Soc, min_arrival_soc: Soc) -> Self {
        Self {
            start_soc,
            min_arrival_soc,
            target_soc: None,
            conditions: DrivingConditions::default(),
        }
    }

    pub fn with_target_soc(mut self, target_soc: Soc) -> Self {
        self.target_soc = Some(target_soc);
        self
    }

    pub fn with_conditions(mut self, conditions: DrivingConditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Check the parts `Soc` cannot check on its own.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.conditions.temperature_c.is_finite() {
            return Err(DomainError::InvalidTrip("temperature must be finite"));
        }
        if !(self.conditions.wind_kmh.is_finite() && self.conditions.wind_kmh >= 0.0) {
            return Err(DomainError::InvalidTrip(
                "wind speed must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
