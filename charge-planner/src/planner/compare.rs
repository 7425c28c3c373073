//! Running every objective over the same inputs.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::candidates::CandidateIndex;
use crate::domain::{TripParameters, VehicleProfile};

use super::config::PlannerConfig;
use super::policy::Objective;
use super::result::{ComparisonResult, Infeasibility, PlanResult};
use super::search::{PlanError, Planner};

impl Planner<'_> {
    /// Plan all three objectives, one after another.
    ///
    /// Every objective is planned even if an earlier one fails.
    pub fn compare(&self, trip: &TripParameters) -> Result<ComparisonResult, PlanError> {
        self.validate(trip)?;
        Ok(ComparisonResult::from_plans(
            Objective::ALL.map(|objective| self.run(trip, objective)),
        ))
    }
}

/// Plan all three objectives for one trip.
///
/// # Examples
///
/// ```
/// use charge_planner::candidates::CandidateIndex;
/// use charge_planner::domain::{ChargingCurve, LatLng, RouteGeometry, Soc, TripParameters, VehicleProfile};
/// use charge_planner::planner::{PlannerConfig, compare};
/// use charge_planner::pricing::PricingTable;
///
/// let route = RouteGeometry::new(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 0.0)], 110.0, 80.0).unwrap();
/// let index = CandidateIndex::build(&route, &[], 5.0, &PricingTable::default()).unwrap();
/// let vehicle = VehicleProfile::new("ev", "Make", "Model", 60.0, 400.0, 100.0, ChargingCurve::typical(100.0).unwrap()).unwrap();
/// let trip = TripParameters::new(Soc::new(80.0).unwrap(), Soc::new(10.0).unwrap());
///
/// let comparison = compare(&index, &vehicle, &trip, &PlannerConfig::default()).unwrap();
/// assert!(comparison.all_succeeded());
/// assert_eq!(comparison.fewest.stop_count(), 0);
/// ```
pub fn compare(
    index: &CandidateIndex,
    vehicle: &VehicleProfile,
    trip: &TripParameters,
    config: &PlannerConfig,
) -> Result<ComparisonResult, PlanError> {
    Planner::new(index, vehicle, config).compare(trip)
}

/// Plan all three objectives in parallel on the blocking pool.
///
/// Produces the same result as [`compare`]. A planning task that panics
/// is reported as an aborted plan for its objective.
pub async fn compare_concurrent(
    index: Arc<CandidateIndex>,
    vehicle: Arc<VehicleProfile>,
    trip: TripParameters,
    config: Arc<PlannerConfig>,
) -> Result<ComparisonResult, PlanError> {
    Planner::new(&index, &vehicle, &config).validate(&trip)?;

    let tasks = Objective::ALL.map(|objective| {
        let index = Arc::clone(&index);
        let vehicle = Arc::clone(&vehicle);
        let config = Arc::clone(&config);
        tokio::task::spawn_blocking(move || Planner::new(&index, &vehicle, &config).run(&trip, objective))
    });

    let results = join_all(tasks).await;
    let plans = results
        .into_iter()
        .zip(Objective::ALL)
        .map(|(result, objective)| match result {
            Ok(plan) => plan,
            Err(error) => {
                warn!(objective = %objective, error = %error, "Planning task failed");
                PlanResult::infeasible(objective, Infeasibility::Aborted)
            }
        });

    let comparison = ComparisonResult::from_plans(plans);
    debug!(succeeded = comparison.successful().len(), "Concurrent comparison complete");
    Ok(comparison)
}
