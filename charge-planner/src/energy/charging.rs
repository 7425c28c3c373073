//! Charging speed and charge-time integration.

use serde::{Deserialize, Serialize};

use crate::domain::{Soc, VehicleProfile};

/// Integration step (% state of charge).
pub const SOC_STEP_PCT: f64 = 1.0;

/// Outcome of charging between two states of charge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeSession {
    pub minutes: f64,
    pub energy_kwh: f64,
    /// Energy over time (kW); zero for an empty session
    pub avg_power_kw: f64,
    pub peak_power_kw: f64,
}

impl ChargeSession {
    const EMPTY: ChargeSession = ChargeSession {
        minutes: 0.0,
        energy_kwh: 0.0,
        avg_power_kw: 0.0,
        peak_power_kw: 0.0,
    };
}

/// Power the battery accepts at `soc` from a connector rated `station_kw`.
///
/// The lowest of the station rating, the vehicle's DC limit and the curve.
pub fn charge_rate_at(soc: f64, station_kw: f64, vehicle: &VehicleProfile) -> f64 {
    let rate = station_kw
        .min(vehicle.max_dc_kw())
        .min(vehicle.curve().rate_at(soc));
    if rate.is_finite() { rate.max(0.0) } else { 0.0 }
}

/// Integrate a charge from `from` to `to` in [`SOC_STEP_PCT`] steps.
///
/// Each step is charged at the rate in its middle; the final step may be
/// partial. Returns `None` when the effective rate is zero anywhere on the
/// way, so the caller can treat the station as unusable.
///
/// # Examples
///
/// ```
/// use charge_planner::domain::{ChargingCurve, Soc, VehicleProfile};
/// use charge_planner::energy::charge_session;
///
/// let vehicle = VehicleProfile::new("ev", "Make", "Model", 60.0, 400.0, 120.0, ChargingCurve::flat(120.0).unwrap()).unwrap();
/// let session = charge_session(Soc::new(20.0).unwrap(), Soc::new(80.0).unwrap(), 60.0, &vehicle).unwrap();
///
/// // 36 kWh at 60 kW
/// assert!((session.minutes - 36.0).abs() < 1e-9);
/// assert!((session.energy_kwh - 36.0).abs() < 1e-9);
/// ```
pub fn charge_session(from: Soc, to: Soc, station_kw: f64, vehicle: &VehicleProfile) -> Option<ChargeSession> {
    let (start, end) = (from.percent(), to.percent());
    if end <= start {
        return Some(ChargeSession::EMPTY);
    }

    let capacity = vehicle.battery_kwh();
    let mut hours = 0.0;
    let mut peak: f64 = 0.0;
    let mut soc = start;

    while soc < end {
        let step = SOC_STEP_PCT.min(end - soc);
        let rate = charge_rate_at(soc + step / 2.0, station_kw, vehicle);
        if rate <= 0.0 {
            return None;
        }
        hours += step / 100.0 * capacity / rate;
        peak = peak.max(rate);
        soc += step;
    }

    let energy_kwh = (end - start) / 100.0 * capacity;
    let minutes = hours * 60.0;
    Some(ChargeSession {
        minutes,
        energy_kwh,
        avg_power_kw: energy_kwh / hours,
        peak_power_kw: peak,
    })
}

/// Minutes to charge from `from` to `to`, or `None` if it cannot be done.
pub fn time_to_charge(from: Soc, to: Soc, station_kw: f64, vehicle: &VehicleProfile) -> Option<f64> {
    charge_session(from, to, station_kw, vehicle).map(|s| s.minutes)
}
