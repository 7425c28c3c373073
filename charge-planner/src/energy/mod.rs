//! Energy models: what driving costs and how fast charging refills it.
//!
//! Both halves are pure functions over validated domain types.

mod charging;
mod consumption;

pub use charging::{ChargeSession, SOC_STEP_PCT, charge_rate_at, charge_session, time_to_charge};
pub use consumption::{ConsumptionModel, EnergyContext, SurchargeBand, WeatherSurcharges};
