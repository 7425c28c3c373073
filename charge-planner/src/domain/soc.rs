//! State-of-charge type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when constructing an invalid state of charge.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid state of charge {value}: {reason}")]
pub struct InvalidSoc {
    value: f64,
    reason: &'static str,
}

/// A battery state of charge, as a percentage of usable capacity.
///
/// Always finite and within `[0, 100]`. This type guarantees that any
/// `Soc` value is valid by construction.
///
/// # Examples
///
/// ```
/// use charge_planner::domain::Soc;
///
/// let soc = Soc::new(50.0).unwrap();
/// assert_eq!(soc.percent(), 50.0);
/// assert_eq!(soc.energy_kwh(75.0), 37.5);
///
/// // Out-of-range values are rejected
/// assert!(Soc::new(-1.0).is_err());
/// assert!(Soc::new(100.5).is_err());
/// assert!(Soc::new(f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Soc(f64);

impl Soc {
    /// An empty battery.
    pub const EMPTY: Soc = Soc(0.0);

    /// A full battery.
    pub const FULL: Soc = Soc(100.0);

    /// Create a state of charge from a percentage.
    pub fn new(percent: f64) -> Result<Self, InvalidSoc> {
        if !percent.is_finite() {
            return Err(InvalidSoc {
                value: percent,
                reason: "must be a finite number",
            });
        }
        if !(0.0..=100.0).contains(&percent) {
            return Err(InvalidSoc {
                value: percent,
                reason: "must be between 0 and 100",
            });
        }
        Ok(Soc(percent))
    }

    /// Create a state of charge, clamping into `[0, 100]`.
    ///
    /// Non-finite input gives an empty battery.
    pub fn saturating(percent: f64) -> Self {
        if percent.is_finite() {
            Soc(percent.clamp(0.0, 100.0))
        } else {
            Soc::EMPTY
        }
    }

    /// State of charge holding `energy_kwh` in a battery of `capacity_kwh`.
    ///
    /// Clamped like [`Soc::saturating`].
    pub fn from_energy(energy_kwh: f64, capacity_kwh: f64) -> Self {
        Soc::saturating(energy_kwh / capacity_kwh * 100.0)
    }

    /// Returns the percentage (0-100).
    pub fn percent(self) -> f64 {
        self.0
    }

    /// Returns the fraction (0-1).
    pub fn fraction(self) -> f64 {
        self.0 / 100.0
    }

    /// Energy held at this charge by a battery of `capacity_kwh`.
    pub fn energy_kwh(self, capacity_kwh: f64) -> f64 {
        self.fraction() * capacity_kwh
    }

    pub fn min(self, other: Soc) -> Soc {
        Soc(self.0.min(other.0))
    }

    pub fn max(self, other: Soc) -> Soc {
        Soc(self.0.max(other.0))
    }
}

impl TryFrom<f64> for Soc {
    type Error = InvalidSoc;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Soc::new(value)
    }
}

impl From<Soc> for f64 {
    fn from(value: Soc) -> Self {
        value.0
    }
}

impl fmt::Debug for Soc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Soc({}%)", self.0)
    }
}

impl fmt::Display for Soc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any in-range percentage is accepted and preserved
        #[test]
        fn in_range_roundtrip(p in 0.0f64..=100.0) {
            let soc = Soc::new(p).unwrap();
            prop_assert_eq!(soc.percent(), p);
        }

        /// Converting to energy and back is stable
        #[test]
        fn energy_roundtrip(p in 0.0f64..=100.0, capacity in 10.0f64..150.0) {
            let soc = Soc::new(p).unwrap();
            let back = Soc::from_energy(soc.energy_kwh(capacity), capacity);
            prop_assert!((back.percent() - p).abs() < 1e-9);
        }

        /// Values above 100 are always rejected
        #[test]
        fn above_range_rejected(p in 100.000_001f64..1e6) {
            prop_assert!(Soc::new(p).is_err());
        }
    }
}
