use clap::Parser;
use std::path::PathBuf;

/// Haptos replay: drives the force-space contact filter through scripted scenarios.
///
/// This struct defines the command-line arguments of the replay binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/wall_contact.toml")]
    pub scenario: PathBuf,

    /// Run every scenario found under this directory instead of `--scenario`.
    #[arg(long)]
    pub scenario_dir: Option<PathBuf>,

    /// Replace every seed in the scenario files.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the phase reports of the last scenario to this TOML file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Only log warnings and errors.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}
