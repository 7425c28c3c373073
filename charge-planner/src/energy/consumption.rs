//! Per-segment energy consumption.

use serde::{Deserialize, Serialize};

use crate::domain::{DrivingConditions, VehicleProfile};

/// Standard gravity (m/s²).
const GRAVITY: f64 = 9.81;

/// Joules per kWh.
const JOULES_PER_KWH: f64 = 3_600_000.0;

/// A half-open band `[from, to)` with a consumption surcharge.
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurchargeBand {
    #[serde(default)]
    pub from: Option<f64>,
    #[serde(default)]
    pub to: Option<f64>,
    /// Extra consumption in percent of the baseline
    pub surcharge_pct: f64,
}

impl SurchargeBand {
    pub const fn new(from: Option<f64>, to: Option<f64>, surcharge_pct: f64) -> Self {
        Self {
            from,
            to,
            surcharge_pct,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.from.is_none_or(|from| value >= from) && self.to.is_none_or(|to| value < to)
    }
}

/// Weather surcharge tables for temperature (°C) and wind (km/h).
///
/// The first matching band of each table applies; a value matching no band
/// adds nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSurcharges {
    pub temperature: Vec<SurchargeBand>,
    pub wind: Vec<SurchargeBand>,
}

impl Default for WeatherSurcharges {
    fn default() -> Self {
        Self {
            temperature: vec![
                SurchargeBand::new(None, Some(0.0), 25.0),
                SurchargeBand::new(Some(0.0), Some(10.0), 15.0),
                SurchargeBand::new(Some(10.0), Some(20.0), 5.0),
                SurchargeBand::new(Some(35.0), None, 10.0),
            ],
            wind: vec![
                SurchargeBand::new(Some(15.0), Some(30.0), 5.0),
                SurchargeBand::new(Some(30.0), Some(50.0), 10.0),
                SurchargeBand::new(Some(50.0), None, 15.0),
            ],
        }
    }
}

impl WeatherSurcharges {
    fn lookup(bands: &[SurchargeBand], value: f64) -> f64 {
        bands
            .iter()
            .find(|band| band.contains(value))
            .map_or(0.0, |band| band.surcharge_pct)
    }

    /// Combined surcharge in percent.
    pub fn surcharge_pct(&self, temperature_c: f64, wind_kmh: f64) -> f64 {
        Self::lookup(&self.temperature, temperature_c) + Self::lookup(&self.wind, wind_kmh)
    }

    /// Multiplier applied to baseline consumption.
    pub fn multiplier(&self, temperature_c: f64, wind_kmh: f64) -> f64 {
        1.0 + self.surcharge_pct(temperature_c, wind_kmh) / 100.0
    }
}

/// Converts driven segments into battery energy.
///
/// # Examples
///
/// ```
/// use charge_planner::domain::{ChargingCurve, VehicleProfile};
/// use charge_planner::energy::ConsumptionModel;
///
/// let curve = ChargingCurve::flat(150.0).unwrap();
/// let vehicle = VehicleProfile::new("ev", "Make", "Model", 75.0, 480.0, 150.0, curve).unwrap();
///
/// // Flat, mild and still: baseline 75 / 480 kWh per km
/// let kwh = ConsumptionModel::default().energy_for_segment(100.0, 0.0, 20.0, 0.0, &vehicle);
/// assert!((kwh - 15.625).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumptionModel {
    pub weather: WeatherSurcharges,
    /// Share of potential energy recovered on descents
    pub regen_efficiency: f64,
    /// Share of battery energy delivered at the wheels when climbing
    pub drivetrain_efficiency: f64,
}

impl Default for ConsumptionModel {
    fn default() -> Self {
        Self {
            weather: WeatherSurcharges::default(),
            regen_efficiency: 0.65,
            drivetrain_efficiency: 0.9,
        }
    }
}

impl ConsumptionModel {
    /// Energy needed to drive one segment (kWh), never negative.
    pub fn energy_for_segment(
        &self,
        distance_km: f64,
        elevation_delta_m: f64,
        temperature_c: f64,
        wind_kmh: f64,
        vehicle: &VehicleProfile,
    ) -> f64 {
        let base = distance_km.max(0.0)
            * vehicle.baseline_kwh_per_km()
            * self.weather.multiplier(temperature_c, wind_kmh);

        let potential_kwh = vehicle.mass_kg() * GRAVITY * elevation_delta_m.abs() / JOULES_PER_KWH;
        let elevation = if elevation_delta_m > 0.0 {
            potential_kwh / self.drivetrain_efficiency
        } else {
            -potential_kwh * self.regen_efficiency
        };

        let total = base + elevation;
        if total.is_finite() { total.max(0.0) } else { 0.0 }
    }

    /// Check efficiencies are usable.
    pub fn is_valid(&self) -> bool {
        let unit = |x: f64| x.is_finite() && x > 0.0 && x <= 1.0;
        unit(self.drivetrain_efficiency) && self.regen_efficiency.is_finite() && (0.0..=1.0).contains(&self.regen_efficiency)
    }
}

/// A consumption model bound to one vehicle and one set of conditions.
#[derive(Debug, Clone, Copy)]
pub struct EnergyContext<'a> {
    pub model: &'a ConsumptionModel,
    pub vehicle: &'a VehicleProfile,
    pub conditions: DrivingConditions,
}

impl<'a> EnergyContext<'a> {
    pub fn new(model: &'a ConsumptionModel, vehicle: &'a VehicleProfile, conditions: DrivingConditions) -> Self {
        Self {
            model,
            vehicle,
            conditions,
        }
    }

    /// Energy for one segment under the bound conditions (kWh).
    pub fn segment(&self, distance_km: f64, elevation_delta_m: f64) -> f64 {
        self.model.energy_for_segment(
            distance_km,
            elevation_delta_m,
            self.conditions.temperature_c,
            self.conditions.wind_kmh,
            self.vehicle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChargingCurve;

    fn vehicle() -> VehicleProfile {
        VehicleProfile::new("ev", "Make", "Model", 75.0, 480.0, 150.0, ChargingCurve::flat(150.0).unwrap()).unwrap()
    }

    #[test]
    fn flat_baseline() {
        let model = ConsumptionModel::default();
        let kwh = model.energy_for_segment(100.0, 0.0, 20.0, 0.0, &vehicle());
        assert!((kwh - 15.625).abs() < 1e-9);
    }

    #[test]
    fn cold_surcharge() {
        let model = ConsumptionModel::default();
        let kwh = model.energy_for_segment(100.0, 0.0, -5.0, 0.0, &vehicle());
        assert!((kwh - 15.625 * 1.25).abs() < 1e-9);
    }

    #[test]
    fn surcharges_sum() {
        let weather = WeatherSurcharges::default();
        // 5 °C: +15%, 40 km/h: +10%
        assert!((weather.multiplier(5.0, 40.0) - 1.25).abs() < 1e-12);
        assert_eq!(weather.surcharge_pct(25.0, 0.0), 0.0);
        assert_eq!(weather.surcharge_pct(40.0, 0.0), 10.0);
    }

    #[test]
    fn band_edges_are_half_open() {
        let weather = WeatherSurcharges::default();
        assert_eq!(weather.surcharge_pct(0.0, 0.0), 15.0);
        assert_eq!(weather.surcharge_pct(10.0, 0.0), 5.0);
        assert_eq!(weather.surcharge_pct(20.0, 0.0), 0.0);
        assert_eq!(weather.surcharge_pct(35.0, 0.0), 10.0);
        assert_eq!(weather.surcharge_pct(20.0, 15.0), 5.0);
        assert_eq!(weather.surcharge_pct(20.0, 50.0), 15.0);
        assert_eq!(weather.surcharge_pct(20.0, 14.9), 0.0);
    }

    #[test]
    fn climbing_costs_potential_energy() {
        let model = ConsumptionModel::default();
        let kwh = model.energy_for_segment(0.0, 100.0, 20.0, 0.0, &vehicle());
        // 1700 kg * 9.81 * 100 m = 1_667_700 J = 0.46325 kWh, over 0.9
        assert!((kwh - 0.46325 / 0.9).abs() < 1e-9);
    }

    #[test]
    fn descent_recovers_energy() {
        let model = ConsumptionModel::default();
        let flat = model.energy_for_segment(10.0, 0.0, 20.0, 0.0, &vehicle());
        let down = model.energy_for_segment(10.0, -100.0, 20.0, 0.0, &vehicle());
        assert!((flat - down - 0.46325 * 0.65).abs() < 1e-9);
    }

    #[test]
    fn steep_descent_clamps_at_zero() {
        let model = ConsumptionModel::default();
        assert_eq!(model.energy_for_segment(1.0, -1000.0, 20.0, 0.0, &vehicle()), 0.0);
        assert_eq!(model.energy_for_segment(-5.0, 0.0, 20.0, 0.0, &vehicle()), 0.0);
    }

    #[test]
    fn context_binds_conditions() {
        let model = ConsumptionModel::default();
        let vehicle = vehicle();
        let ctx = EnergyContext::new(
            &model,
            &vehicle,
            DrivingConditions {
                temperature_c: -5.0,
                wind_kmh: 0.0,
            },
        );
        assert!((ctx.segment(1.0, 0.0) - 0.15625 * 1.25).abs() < 1e-12);
    }

    #[test]
    fn partial_config_deserializes() {
        let model: ConsumptionModel = serde_json::from_str(r#"{"regen_efficiency": 0.5}"#).unwrap();
        assert_eq!(model.regen_efficiency, 0.5);
        assert_eq!(model.drivetrain_efficiency, 0.9);
        assert_eq!(model.weather, WeatherSurcharges::default());
        assert!(model.is_valid());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::ChargingCurve;
    use proptest::prelude::*;

    proptest! {
        /// Consumption is never negative
        #[test]
        fn never_negative(
            distance in -10.0f64..500.0,
            dh in -3000.0f64..3000.0,
            temp in -30.0f64..50.0,
            wind in 0.0f64..120.0,
        ) {
            let vehicle = VehicleProfile::new("ev", "M", "X", 60.0, 400.0, 100.0, ChargingCurve::flat(100.0).unwrap()).unwrap();
            let kwh = ConsumptionModel::default().energy_for_segment(distance, dh, temp, wind, &vehicle);
            prop_assert!(kwh >= 0.0);
        }

        /// On flat ground consumption grows with distance
        #[test]
        fn monotone_in_distance(a in 0.0f64..500.0, b in 0.0f64..500.0, temp in -30.0f64..50.0) {
            let vehicle = VehicleProfile::new("ev", "M", "X", 60.0, 400.0, 100.0, ChargingCurve::flat(100.0).unwrap()).unwrap();
            let model = ConsumptionModel::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                model.energy_for_segment(lo, 0.0, temp, 0.0, &vehicle)
                    <= model.energy_for_segment(hi, 0.0, temp, 0.0, &vehicle)
            );
        }
    }
}
