// haptos_replay/src/lib.rs

//! Headless scenario replay for the `haptos_core` contact filter.

pub mod cli;
pub mod config;
pub mod error;
pub mod replay;

use std::path::PathBuf;

use tracing::info;

use crate::cli::Cli;
use crate::config::{discover_scenarios, load_scenario};
use crate::error::ReplayError;
use crate::replay::{run_scenario, ReplayReport};

/// Runs every scenario the command line selects, in order.
pub fn run(cli: &Cli) -> Result<Vec<ReplayReport>, ReplayError> {
    let paths: Vec<PathBuf> = match &cli.scenario_dir {
        Some(dir) => discover_scenarios(dir)?,
        None => vec![cli.scenario.clone()],
    };

    let mut reports = Vec::with_capacity(paths.len());
    for path in &paths {
        let scenario = load_scenario(path)?;
        reports.push(run_scenario(&scenario, cli.seed)?);
    }

    if let (Some(target), Some(last)) = (&cli.report, reports.last()) {
        std::fs::write(target, last.to_toml()?)?;
        info!("Wrote replay report to {:?}", target);
    }
    Ok(reports)
}
