use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pl_cli::commands::{sessions, stats, status, titles, util};
use pl_cli::{Cli, Commands, Config};
use pl_core::{PlayLog, TimeRange};

/// Load config and the play log it points at.
fn open_log(config_path: Option<&Path>, log_override: Option<&Path>) -> Result<(PlayLog, Config)> {
    let mut config = Config::load_from(config_path).context("failed to load configuration")?;
    if let Some(path) = log_override {
        config.log_path = path.to_path_buf();
    }
    tracing::debug!(?config, "loaded configuration");

    let log = PlayLog::open_with(&config.log_path, &config.load_options())
        .with_context(|| format!("failed to load play log {}", config.log_path.display()))?;
    Ok((log, config))
}

/// Resolves the stats range, defaulting to the last week.
fn stats_range(start: Option<&str>, end: Option<&str>) -> Result<TimeRange> {
    let now = Utc::now();
    let end = end.map_or(Ok(now), |s| util::parse_datetime(s, now))?;
    let start = start.map_or(Ok(end - Duration::days(7)), |s| util::parse_datetime(s, now))?;
    if start > end {
        anyhow::bail!("--start must not be after --end");
    }
    Ok(TimeRange::new(
        util::to_wall_secs(start),
        util::to_wall_secs(end),
    ))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (log, config) = open_log(cli.config.as_deref(), cli.log.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Status => status::run(&mut stdout, &config, &log)?,
        Commands::Titles { json } => titles::run(&mut stdout, &log, *json)?,
        Commands::Sessions { app, account, json } => {
            sessions::run(&mut stdout, &log, *app, *account, *json)?;
        }
        Commands::Stats {
            account,
            start,
            end,
            json,
        } => {
            let range = stats_range(start.as_deref(), end.as_deref())?;
            stats::run(&mut stdout, &log, *account, range, *json)?;
        }
    }

    stdout.flush()?;
    Ok(())
}
