//! Per-operator charging tariffs.
//!
//! Operators price by connector class: AC, and three DC power tiers. A
//! station's price is looked up by its operator name; stations with an
//! unknown operator, or a tier the operator does not offer, fall back to
//! a flat tariff.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{PowerType, Station};

/// Fallback DC price per kWh when nothing else applies.
pub const FALLBACK_DC_PRICE: f64 = 12.5;

/// Fallback AC price per kWh when nothing else applies.
pub const FALLBACK_AC_PRICE: f64 = 9.0;

/// Price class of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerTier {
    Ac,
    /// DC below 100 kW
    DcLow,
    /// DC from 100 kW up to 180 kW
    DcMid,
    /// DC above 180 kW
    DcHigh,
}

impl PowerTier {
    pub fn classify(power_type: PowerType, power_kw: f64) -> Self {
        match power_type {
            PowerType::Ac => PowerTier::Ac,
            PowerType::Dc if power_kw < 100.0 => PowerTier::DcLow,
            PowerType::Dc if power_kw <= 180.0 => PowerTier::DcMid,
            PowerType::Dc => PowerTier::DcHigh,
        }
    }
}

/// One operator's prices per kWh. `None` means the tier is not offered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tariff {
    pub ac: Option<f64>,
    pub dc_low: Option<f64>,
    pub dc_mid: Option<f64>,
    pub dc_high: Option<f64>,
}

impl Tariff {
    pub const fn new(ac: Option<f64>, dc_low: Option<f64>, dc_mid: Option<f64>, dc_high: Option<f64>) -> Self {
        Self {
            ac,
            dc_low,
            dc_mid,
            dc_high,
        }
    }

    /// Price for a tier, ignoring unusable entries.
    pub fn price(&self, tier: PowerTier) -> Option<f64> {
        let price = match tier {
            PowerTier::Ac => self.ac,
            PowerTier::DcLow => self.dc_low,
            PowerTier::DcMid => self.dc_mid,
            PowerTier::DcHigh => self.dc_high,
        };
        price.filter(|p| p.is_finite() && *p >= 0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PricingRecord {
    #[serde(default)]
    operators: HashMap<String, Tariff>,
    #[serde(default)]
    fallback: Tariff,
}

/// Operator tariffs keyed by normalized operator name.
///
/// # Examples
///
/// ```
/// use charge_planner::domain::{LatLng, PowerType, Station};
/// use charge_planner::pricing::PricingTable;
///
/// let table = PricingTable::default();
/// let station = Station::new("s", LatLng::new(40.0, 30.0), 120.0, PowerType::Dc).with_operator("zes");
/// assert_eq!(table.price_for(&station), 12.99);
///
/// let unknown = Station::new("u", LatLng::new(40.0, 30.0), 22.0, PowerType::Ac);
/// assert_eq!(table.price_for(&unknown), 9.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PricingRecord", into = "PricingRecord")]
pub struct PricingTable {
    operators: HashMap<String, Tariff>,
    fallback: Tariff,
}

impl PricingTable {
    /// A table with no operators, pricing everything at the fallback.
    pub fn empty() -> Self {
        Self {
            operators: HashMap::new(),
            fallback: Tariff::default(),
        }
    }

    /// Add or replace an operator's tariff.
    pub fn with_operator(mut self, operator: &str, tariff: Tariff) -> Self {
        self.operators.insert(normalize(operator), tariff);
        self
    }

    /// Replace the fallback tariff.
    pub fn with_fallback(mut self, fallback: Tariff) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn tariff(&self, operator: &str) -> Option<&Tariff> {
        self.operators.get(&normalize(operator))
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Price per kWh for charging at `station`.
    ///
    /// Operator tariff first, then the table's fallback, then the
    /// built-in constants.
    pub fn price_for(&self, station: &Station) -> f64 {
        let tier = PowerTier::classify(station.power_type, station.power_kw);
        station
            .operator()
            .and_then(|op| self.tariff(op))
            .and_then(|t| t.price(tier))
            .or_else(|| self.fallback.price(tier))
            .unwrap_or(match station.power_type {
                PowerType::Ac => FALLBACK_AC_PRICE,
                PowerType::Dc => FALLBACK_DC_PRICE,
            })
    }
}

impl Default for PricingTable {
    /// Published tariffs of the larger Turkish networks.
    fn default() -> Self {
        [
            ("ZES", Tariff::new(Some(8.99), Some(10.99), Some(12.99), Some(12.99))),
            ("Eşarj", Tariff::new(Some(9.40), Some(11.50), Some(13.70), Some(13.70))),
            ("Trugo", Tariff::new(Some(8.49), Some(10.60), Some(11.82), Some(11.82))),
            ("Tesla Supercharger", Tariff::new(None, Some(11.10), Some(11.10), Some(11.10))),
            ("Voltrun", Tariff::new(Some(8.29), Some(10.49), Some(12.49), Some(12.49))),
            ("Petrol Ofisi e-POwer", Tariff::new(Some(8.49), Some(9.99), Some(10.99), Some(11.99))),
            ("Beefull", Tariff::new(Some(8.50), Some(10.50), Some(12.00), Some(12.50))),
            ("Aksa Şarj", Tariff::new(Some(8.99), Some(9.99), Some(11.49), Some(12.49))),
            ("Sharz.net", Tariff::new(Some(8.99), Some(10.99), Some(12.49), None)),
            ("Astor Enerji", Tariff::new(Some(9.00), Some(11.00), Some(12.50), Some(13.00))),
        ]
        .into_iter()
        .fold(PricingTable::empty(), |table, (name, tariff)| table.with_operator(name, tariff))
    }
}

impl From<PricingRecord> for PricingTable {
    fn from(record: PricingRecord) -> Self {
        record
            .operators
            .into_iter()
            .fold(PricingTable::empty().with_fallback(record.fallback), |table, (name, tariff)| {
                table.with_operator(&name, tariff)
            })
    }
}

impl From<PricingTable> for PricingRecord {
    fn from(table: PricingTable) -> Self {
        Self {
            operators: table.operators,
            fallback: table.fallback,
        }
    }
}

/// Lowercase and collapse whitespace so "Aksa  ŞARJ " matches "Aksa Şarj".
fn normalize(operator: &str) -> String {
    operator
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LatLng;

    fn dc(kw: f64, operator: &str) -> Station {
        Station::new("s", LatLng::new(40.0, 30.0), kw, PowerType::Dc).with_operator(operator)
    }

    #[test]
    fn tiers() {
        assert_eq!(PowerTier::classify(PowerType::Ac, 22.0), PowerTier::Ac);
        assert_eq!(PowerTier::classify(PowerType::Dc, 60.0), PowerTier::DcLow);
        assert_eq!(PowerTier::classify(PowerType::Dc, 100.0), PowerTier::DcMid);
        assert_eq!(PowerTier::classify(PowerType::Dc, 180.0), PowerTier::DcMid);
        assert_eq!(PowerTier::classify(PowerType::Dc, 180.5), PowerTier::DcHigh);
    }

    #[test]
    fn operator_lookup_is_normalized() {
        let table = PricingTable::default();
        assert_eq!(table.price_for(&dc(60.0, "  aksa   ŞARJ ")), 9.99);
        assert_eq!(table.price_for(&dc(300.0, "Petrol Ofisi e-POwer")), 11.99);
    }

    #[test]
    fn missing_tier_falls_back() {
        let table = PricingTable::default();
        // Sharz.net has no >180 kW tariff
        assert_eq!(table.price_for(&dc(300.0, "Sharz.net")), FALLBACK_DC_PRICE);
        // Tesla has no AC tariff
        let ac = Station::new("t", LatLng::new(40.0, 30.0), 11.0, PowerType::Ac).with_operator("Tesla Supercharger");
        assert_eq!(table.price_for(&ac), FALLBACK_AC_PRICE);
    }

    #[test]
    fn table_fallback_beats_constants() {
        let table = PricingTable::empty().with_fallback(Tariff::new(None, Some(7.0), Some(7.0), Some(7.0)));
        assert_eq!(table.price_for(&dc(150.0, "Nobody")), 7.0);
    }

    #[test]
    fn deserialize_normalizes_keys() {
        let json = r#"{"operators": {"My Network": {"dc_mid": 6.5}}}"#;
        let table: PricingTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.price_for(&dc(150.0, "my network")), 6.5);
        assert_eq!(table.price_for(&dc(50.0, "my network")), FALLBACK_DC_PRICE);
    }

    #[test]
    fn negative_prices_ignored() {
        let table = PricingTable::empty().with_operator("Odd", Tariff::new(None, None, Some(-1.0), None));
        assert_eq!(table.price_for(&dc(150.0, "Odd")), FALLBACK_DC_PRICE);
    }
}
