// haptos_replay/src/error.rs

use std::path::PathBuf;

use haptos_core::error::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("scenario file not found at {0:?}")]
    MissingScenario(PathBuf),

    #[error("failed to load or parse scenario: {0}")]
    Config(#[from] figment::Error),

    #[error("scenario '{0}' has no phases to replay")]
    EmptyScenario(String),

    #[error("no scenario files found under {0:?}")]
    NoScenarios(PathBuf),

    #[error("noise '{field}' must have a finite, non-negative std (got {std})")]
    InvalidNoise { field: &'static str, std: f64 },

    #[error("failed to serialize replay report: {0}")]
    Report(#[from] toml::ser::Error),

    #[error("failed to write replay report: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Filter(#[from] FilterError),
}
