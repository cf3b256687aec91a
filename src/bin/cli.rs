//! lot-tracker CLI
//!
//! Long-running entry point: loads configuration, sets up the rotating log
//! file and runs the polling loop until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use lot_tracker::{
    error::Result,
    logging,
    models::Config,
    pipeline::{self, Schedule, Tracker},
    services::{ErrorPolicy, Notifier, SiteChecker, SiteTargets, SmtpMailer},
    storage::LocalStorage,
    utils::http::HttpFetcher,
};

/// lot-tracker - House Lot Availability Tracker
#[derive(Parser, Debug)]
#[command(
    name = "lot-tracker",
    version,
    about = "Emails when house lot availability changes"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Directory for the rotating log file
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run a single check cycle and exit
    #[arg(long)]
    once: bool,
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(&cli.log_dir, cli.verbose)?;

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Cannot start: {}", e);
            return Err(e);
        }
    };
    tracing::info!("Loaded configuration from {}\n{}", cli.config.display(), config);

    let mailer = Arc::new(SmtpMailer::from_config(&config));
    let notifier = Arc::new(Notifier::from_config(&config, mailer));
    let checker = SiteChecker::new(
        Box::new(HttpFetcher::from_config(&config)?),
        LocalStorage::new(&config.state_dir),
        Arc::clone(&notifier),
        SiteTargets::from_config(&config),
        ErrorPolicy::from_config(&config),
    );
    let mut tracker = Tracker::new(checker, notifier);

    tracing::info!("Application Started !");

    if cli.once {
        let cycle = tracker.check().await;
        tracing::info!("Single run complete (changed: {})", cycle.changed());
        return Ok(());
    }

    let schedule = Schedule {
        check_every: config.check_interval(),
        health_every: config.health_interval(),
        health_enabled: config.service_health_notification,
    };
    pipeline::run(tracker, schedule).await;

    Ok(())
}
