use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use charge_planner::catalog::default_catalog;
use charge_planner::scenario::Scenario;
use clap::{Parser, ValueHint};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan EV charging stops for a scenario file", long_about = None)]
struct Args {
    /// Scenario JSON file
    #[arg(value_hint = ValueHint::FilePath)]
    scenario: PathBuf,

    /// Plan the objectives one after another instead of in parallel
    #[arg(long)]
    sequential: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let scenario = match Scenario::from_path(&args.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!(error = %e, "Failed to load scenario");
            return ExitCode::FAILURE;
        }
    };

    let catalog = default_catalog();
    let result = if args.sequential {
        scenario.run(&catalog)
    } else {
        scenario.run_concurrent(&catalog).await
    };
    let comparison = match result {
        Ok(comparison) => comparison,
        Err(e) => {
            error!(error = %e, "Planning failed");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&comparison) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!(error = %e, "Failed to serialize result");
            return ExitCode::FAILURE;
        }
    }

    if comparison.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        // Some objective could not finish the trip
        ExitCode::from(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_scenario_and_flag() {
        let args = Args::try_parse_from(["charge-planner", "trip.json"]).unwrap();
        assert_eq!(args.scenario, PathBuf::from("trip.json"));
        assert!(!args.sequential);

        let args = Args::try_parse_from(["charge-planner", "--sequential", "trip.json"]).unwrap();
        assert!(args.sequential);
    }

    #[test]
    fn scenario_is_required() {
        assert!(Args::try_parse_from(["charge-planner"]).is_err());
    }
}
