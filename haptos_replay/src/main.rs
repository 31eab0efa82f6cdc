// haptos_replay/src/main.rs

use std::process::ExitCode;

use clap::Parser;
use haptos_replay::cli::Cli;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Warnings from every crate, progress from the replay itself.
    let default_filter = if cli.quiet {
        "warn"
    } else {
        "warn,haptos_replay=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match haptos_replay::run(&cli) {
        Ok(reports) => {
            for report in &reports {
                let (name, particles) = (&report.scenario, report.particle_count);
                println!("scenario '{name}' ({particles} particles)");
                for phase in &report.phases {
                    println!("  {phase}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Replay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
