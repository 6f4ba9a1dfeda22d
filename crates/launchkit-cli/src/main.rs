// launchkit CLI entry point

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use launchkit_cli::{commands, logging};
use launchkit_config::LaunchSet;
use launchkit_process::{ProcessTracker, TerminationStrategy};
use tracing::warn;

/// Starts declared long-running services, waits for their readiness and stops
/// them again at the end of the run.
#[derive(Debug, Parser)]
#[command(name = "launchkit", version)]
struct Cli {
    /// Path to the launch declaration file
    #[arg(short, long, default_value = "launchkit.toml")]
    config: PathBuf,

    /// Working directory for launched processes
    #[arg(long, default_value = "target/launchers")]
    work_dir: PathBuf,

    /// Defer stopping until Enter is pressed
    #[arg(long)]
    wait_for_input: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let set = LaunchSet::load_from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    std::fs::create_dir_all(&cli.work_dir)
        .with_context(|| format!("creating work directory {}", cli.work_dir.display()))?;

    let tracker = ProcessTracker::new(TerminationStrategy::for_host());

    commands::start_launches(&set, &cli.work_dir, &tracker).await?;

    if cli.wait_for_input {
        wait_for_user_input();
    }

    commands::stop_launches(&set.launches, &tracker).await?;
    Ok(())
}

fn wait_for_user_input() {
    if atty::is(atty::Stream::Stdin) {
        warn!("Waiting for user input before stopping launches...");
        eprintln!("Press Enter to continue");
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    } else {
        warn!("Don't wait for user input as stdin is not interactive");
    }
}
