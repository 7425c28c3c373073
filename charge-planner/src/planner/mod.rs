//! Charging stop planner.
//!
//! This module answers: "Where should I stop to charge on this route, and
//! for how long?" for three objectives: least time, fewest stops and least
//! money.
//!
//! The planner is a greedy forward scan over a prepared
//! [`CandidateIndex`](crate::candidates::CandidateIndex). Each objective
//! plugs in its own station choice and charge level; the comparator runs
//! all three over the same inputs.

mod compare;
mod config;
mod policy;
mod result;
mod search;


pub use compare::{compare, compare_concurrent};
pub use config::PlannerConfig;
pub use policy::Objective;
pub use result::{ChargingStop, ComparisonResult, Infeasibility, PlanResult, StopWarning};
pub use search::{PlanError, Planner};
