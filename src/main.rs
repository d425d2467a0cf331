//! envfilter CLI - Envelope Filter Analysis
//!
//! Command-line tools for inspecting the envelope filter's parameters,
//! center-frequency sweep, filter response and envelope ballistics.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use envfilter::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("envfilter v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd)?,
        None => {
            println!("envfilter v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
        }
    }
    Ok(())
}

fn handle_command(cmd: Commands) -> envfilter::Result<()> {
    match cmd {
        Commands::Params => commands::list_params(),
        Commands::Sweep {
            steps,
            sample_rate,
            preset,
        } => commands::sweep(steps, sample_rate, preset.as_deref()),
        Commands::Response {
            envelope,
            sample_rate,
            points,
            preset,
        } => commands::response(envelope, sample_rate, points, preset.as_deref()),
        Commands::Envelope {
            attack,
            release,
            amplitude,
            sample_rate,
        } => commands::envelope(attack, release, amplitude, sample_rate),
    }
}
