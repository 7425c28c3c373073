//! Electric vehicle charging stop planner.
//!
//! A library that answers: "Where should I stop to charge on this route,
//! and how long for?" for three objectives (least time, fewest stops and
//! least money) over an already-fetched route and station list.

pub mod candidates;
pub mod catalog;
pub mod domain;
pub mod energy;
pub mod planner;
pub mod pricing;
pub mod scenario;
