mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use commands::{AddParams, FillChoice};
use weekfill::config::{Config, LoggingConfig};

#[derive(Parser)]
#[command(
    name = "weekfill",
    version,
    about = "Fill a Monday-Friday schedule from a waitlist with travel-aware conflict checks",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (defaults to WEEKFILL_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true, value_parser = ["text", "json"])]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the weekly schedule and the waitlist
    Show,

    /// Add an event to the waitlist
    Add {
        /// Event title
        #[arg(short, long)]
        title: String,

        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Start time (HH:MM)
        #[arg(long)]
        start: Option<String>,

        /// End time (HH:MM)
        #[arg(long)]
        end: Option<String>,

        /// Location
        #[arg(short, long)]
        address: Option<String>,

        /// Free-form notes
        #[arg(long)]
        description: Option<String>,

        /// The event has no fixed time and is never placed automatically
        #[arg(long, default_value = "false")]
        flexible: bool,
    },

    /// Fetch events from the events API into the waitlist
    Sync,

    /// Extract events from a web page into the waitlist
    Extract {
        /// Page URL
        #[arg(short, long)]
        url: String,
    },

    /// Place waitlist events onto the schedule
    Fill {
        /// On conflict, keep option 1 or 2 without prompting
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2), conflicts_with = "cancel")]
        choose: Option<u8>,

        /// On conflict, keep both events in the waitlist without prompting
        #[arg(long, default_value = "false")]
        cancel: bool,
    },

    /// Move a scheduled event back to the waitlist
    Unschedule {
        /// Event id
        id: Uuid,
    },

    /// Run the conflict oracle service
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    setup_tracing(&config.logging, cli.log_format.as_deref(), cli.verbose)?;

    if let Err(e) = weekfill::metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed, continuing without metrics");
    }

    match cli.command {
        Commands::Show => commands::show(&config)?,

        Commands::Add {
            title,
            date,
            start,
            end,
            address,
            description,
            flexible,
        } => {
            tracing::info!(title = %title, date = ?date, "Starting add command");
            commands::add(
                &config,
                AddParams {
                    title,
                    date,
                    start,
                    end,
                    address,
                    description,
                    time_sensitive: !flexible,
                },
            )?;
        }

        Commands::Sync => {
            tracing::info!(api = %config.events.api_base_url, "Starting sync command");
            commands::sync(&config).await?;
        }

        Commands::Extract { url } => {
            tracing::info!(url = %url, "Starting extract command");
            commands::extract(&config, &url).await?;
        }

        Commands::Fill { choose, cancel } => {
            let choice = match (choose, cancel) {
                (Some(n), _) => FillChoice::Keep(usize::from(n) - 1),
                (None, true) => FillChoice::Cancel,
                (None, false) => FillChoice::Prompt,
            };
            tracing::info!(choice = ?choice, oracle = %config.oracle.url, "Starting fill command");
            commands::fill(&config, choice).await?;
        }

        Commands::Unschedule { id } => commands::unschedule(&config, id)?,

        Commands::Serve { bind } => {
            tracing::info!(bind = ?bind, "Starting serve command");
            commands::serve(&config, bind).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn setup_tracing(logging: &LoggingConfig, cli_format: Option<&str>, verbose: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(logging.filter_directive(verbose))
        .context("Invalid log filter")?;

    if logging.is_json(cli_format) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    Ok(())
}
