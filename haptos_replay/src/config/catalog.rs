// haptos_replay/src/config/catalog.rs

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::ReplayError;

/// Walks `root` and returns every `.toml` file below it, sorted by path.
pub fn discover_scenarios(root: &Path) -> Result<Vec<PathBuf>, ReplayError> {
    if !root.exists() {
        warn!("Scenario directory not found at {:?}.", root);
        return Err(ReplayError::NoScenarios(root.to_path_buf()));
    }

    info!("Discovering scenarios under: {:?}", root);

    let mut scenarios: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(is_scenario_file)
        .map(|e| e.into_path())
        .collect();
    scenarios.sort();

    if scenarios.is_empty() {
        return Err(ReplayError::NoScenarios(root.to_path_buf()));
    }
    Ok(scenarios)
}

fn is_scenario_file(entry: &DirEntry) -> bool {
    let is_toml = entry.path().extension().map_or(false, |ext| ext == "toml");
    !entry.file_type().is_dir() && is_toml
}
