//! Charging stations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::LatLng;

/// Connector power type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerType {
    #[serde(rename = "AC")]
    Ac,
    #[serde(rename = "DC")]
    Dc,
}

impl fmt::Display for PowerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerType::Ac => write!(f, "AC"),
            PowerType::Dc => write!(f, "DC"),
        }
    }
}

/// A charging station as reported by a station directory.
///
/// Stations are taken as-is; whether one is usable for a given route is
/// decided when candidates are built.
///
/// # Examples
///
/// ```
/// use charge_planner::domain::{LatLng, PowerType, Station};
///
/// let station = Station::new("zes-1", LatLng::new(40.0, 30.0), 180.0, PowerType::Dc)
///     .with_name("ZES Bolu")
///     .with_operator("ZES");
///
/// assert_eq!(station.operator(), Some("ZES"));
/// assert!(station.is_dc());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub location: LatLng,
    #[serde(default)]
    pub operator: Option<String>,
    pub power_kw: f64,
    pub power_type: PowerType,
    #[serde(default)]
    pub address: Option<String>,
    /// Plug types on offer; empty when unknown
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connectors: Vec<String>,
}

impl Station {
    /// Create a station with no name, operator, address or connector list.
    pub fn new(id: impl Into<String>, location: LatLng, power_kw: f64, power_type: PowerType) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            location,
            operator: None,
            power_kw,
            power_type,
            address: None,
            connectors: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_connectors<S: Into<String>>(mut self, connectors: impl IntoIterator<Item = S>) -> Self {
        self.connectors = connectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    pub fn is_dc(&self) -> bool {
        self.power_type == PowerType::Dc
    }
}
