//! Results Watcher CLI
//!
//! `run` is the long-lived service: health endpoint plus periodic cycles.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use results_watcher::{
    config,
    error::Result,
    health::{self, HealthState},
    models::Config,
    pipeline::{Notification, Runner, Watcher},
    services::HttpFetcher,
    storage,
};

/// Results Watcher - emails new posts from a results listing
#[derive(Parser, Debug)]
#[command(
    name = "results-watcher",
    version,
    about = "Watches a results listing page and emails new posts"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve /health and run a cycle every interval until interrupted
    Run,

    /// Run a single cycle and exit
    Once,

    /// Validate configuration
    Validate,

    /// Show the persisted snapshot
    Info,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load(&cli.config)?;
    init_logging(cli.verbose, &config.logging.level);

    if cli.config.exists() {
        log::info!("Loaded configuration from {}", cli.config.display());
    } else {
        log::warn!(
            "No config file at {}. Using defaults and environment.",
            cli.config.display()
        );
    }

    match cli.command {
        Command::Run => run(config).await?,

        Command::Once => {
            let store = storage::open(&config.storage).await?;
            let watcher = Watcher::from_config(&config, store)?;
            let report = watcher.run_cycle().await?;

            log::info!(
                "{} posts, {} added, {} removed",
                report.extracted,
                report.diff.added.len(),
                report.diff.removed.len()
            );
            if let Notification::Failed(reason) = &report.notification {
                log::warn!("Notification failed: {reason}");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Source: {}", config.source.url);
            log::info!("✓ Interval: {}s", config.schedule.interval_secs);
            log::info!(
                "✓ Selectors: {}",
                config.extractor.selectors().join(" > ")
            );
            log::info!("✓ Storage: {:?}", config.storage.backend);
            if config.smtp.password.is_none() || config.smtp.recipient.is_none() {
                log::warn!("Mail credentials incomplete; notifications will fail.");
            }
            log::info!("All validations passed!");
        }

        Command::Info => {
            let store = storage::open(&config.storage).await?;
            let snapshot = store.load().await?;

            log::info!("Snapshot: {}", store.location());
            if snapshot.is_empty() {
                log::info!("No snapshot found yet.");
            } else {
                log::info!("{} posts", snapshot.len());
                for post in &snapshot {
                    log::info!("{}", post.line());
                }
            }
        }
    }

    Ok(())
}

/// Run the health listener and the cycle loop until Ctrl-C.
async fn run(config: Config) -> Result<()> {
    let store = storage::open(&config.storage).await?;
    log::info!("Snapshot store: {}", store.location());
    let watcher = Arc::new(Watcher::from_config(&config, store)?);

    let health_state = if config.health.probe {
        let fetcher = Arc::new(HttpFetcher::from_config(&config.source)?);
        HealthState::probing(fetcher, &config.source.url)
    } else {
        HealthState::passive()
    };
    let listener = health::bind(&config.health.host, config.health.port).await?;
    tokio::spawn(async move {
        match health::serve(listener, health_state).await {
            Ok(()) => log::warn!("Health endpoint stopped"),
            Err(e) => log::error!("Health endpoint failed: {e}"),
        }
    });

    let mut runner = Runner::new(watcher, Duration::from_secs(config.schedule.interval_secs))?;

    tokio::select! {
        _ = runner.run_forever() => {}
        _ = tokio::signal::ctrl_c() => {
            log::info!("Interrupted, shutting down.");
        }
    }

    Ok(())
}
