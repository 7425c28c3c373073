//! Domain error types.
//!
//! These errors represent validation failures in the inputs handed to the
//! planner: vehicle data, routes and trip parameters. They are distinct from
//! planning outcomes, where an unreachable destination is a normal result.

use super::InvalidSoc;

/// Domain-level errors for input validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A state-of-charge value was outside `[0, 100]`
    #[error(transparent)]
    Soc(#[from] InvalidSoc),

    /// Charging curve has no breakpoints
    #[error("charging curve must have at least one breakpoint")]
    EmptyCurve,

    /// Charging curve breakpoints go backwards in state of charge
    #[error("charging curve breakpoint {index} has a lower state of charge than its predecessor")]
    CurveNotMonotonic { index: usize },

    /// Charging curve breakpoint has a non-finite or out-of-range value
    #[error("charging curve breakpoint {index} is out of range")]
    CurvePointOutOfRange { index: usize },

    /// Charging curve does not cover 0% to 100%
    #[error("charging curve must span 0% to 100% state of charge")]
    CurveDoesNotSpan,

    /// Vehicle data is unusable (e.g. zero battery capacity)
    #[error("invalid vehicle: {0}")]
    InvalidVehicle(&'static str),

    /// Route geometry is unusable (e.g. no points)
    #[error("invalid route: {0}")]
    InvalidRoute(&'static str),

    /// Trip parameters are unusable (e.g. non-finite temperature)
    #[error("invalid trip: {0}")]
    InvalidTrip(&'static str),

    /// Lateral tolerance for on-route stations is negative or not finite
    #[error("lateral tolerance must be a finite, non-negative distance")]
    InvalidTolerance,
}
