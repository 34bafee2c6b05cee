use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use greenhouse_monitor::client::ThingSpeakClient;
use greenhouse_monitor::config::{load_config, DashboardConfig};
use greenhouse_monitor::dashboard::{build_snapshot, DashboardSnapshot};
use greenhouse_monitor::data_models::Feed;
use greenhouse_monitor::export::{default_file_name, export_to_file};
use greenhouse_monitor::parsers::parse_feed_file;
use greenhouse_monitor::poll_metrics::POLL_METRICS;
use greenhouse_monitor::poller::{Poller, RetryingClient};
use greenhouse_monitor::retry::feed_retry_config;
use greenhouse_monitor::validation::validate_series;

#[derive(Parser, Debug)]
#[command(name = "greenhouse_monitor")]
#[command(about = "Greenhouse telemetry monitor for a ThingSpeak channel", long_about = None)]
struct Args {
    /// JSON configuration file (channel, layout, VPD inputs)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ThingSpeak channel id
    #[arg(long, global = true, env = "THINGSPEAK_CHANNEL_ID")]
    channel_id: Option<String>,

    /// Read API key for private channels
    #[arg(long, global = true, env = "THINGSPEAK_READ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current dashboard snapshot
    Snapshot {
        /// Saved feeds.json to read instead of fetching
        #[arg(long)]
        input: Option<PathBuf>,

        /// Print JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Poll the channel and print a snapshot after every refresh
    Watch {
        /// Stop after this many polls
        #[arg(long)]
        max_polls: Option<u64>,

        #[arg(long)]
        json: bool,
    },
    /// Write the series to a CSV report
    Export {
        /// Output file (defaults to greenhouse_report_<date>.csv)
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    match args.command {
        Command::Snapshot { input, json } => {
            let feed = load_feed(input.as_deref(), &config).await?;
            report_violations(&feed, &config);
            print_snapshot(&build_snapshot(&feed, &config), json)?;
        }
        Command::Watch { max_polls, json } => {
            config.validate().context("Invalid configuration")?;
            let client = ThingSpeakClient::new(&config.channel)
                .context("Failed to build HTTP client")?;
            let mut poller = Poller::new(RetryingClient::new(client), config.clone())
                .with_max_polls(max_polls);

            tokio::select! {
                _ = poller.run(|snapshot| {
                    if let Err(e) = print_snapshot(snapshot, json) {
                        warn!("Failed to print snapshot: {}", e);
                    }
                }) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping poller");
                }
            }

            info!("\n{}", POLL_METRICS.lock().summary());
        }
        Command::Export { output, input } => {
            let feed = load_feed(input.as_deref(), &config).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(default_file_name(Utc::now().date_naive())));
            let rows = export_to_file(&path, &feed.samples, &config.layout)
                .with_context(|| format!("Failed to export to {}", path.display()))?;
            println!("Wrote {} rows to {}", rows, path.display());
        }
    }

    Ok(())
}

/// File config (or defaults), then environment, then command-line flags.
fn resolve_config(args: &Args) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let path_str = path.to_string_lossy();
            info!("Loading configuration from {}", path_str);
            load_config(&path_str)
                .with_context(|| format!("Failed to load configuration from {}", path_str))?
        }
        None => DashboardConfig::default(),
    };
    config
        .apply_env()
        .context("Invalid environment override")?;

    if let Some(channel_id) = &args.channel_id {
        config.channel.channel_id = channel_id.clone();
    }
    if let Some(key) = &args.api_key {
        config.channel.read_api_key = Some(key.clone());
    }
    Ok(config)
}

async fn load_feed(input: Option<&Path>, config: &DashboardConfig) -> Result<Feed> {
    if let Some(path) = input {
        return parse_feed_file(path)
            .with_context(|| format!("Failed to read feed from {}", path.display()));
    }

    config.validate().context("Invalid configuration")?;
    let client = ThingSpeakClient::new(&config.channel).context("Failed to build HTTP client")?;
    client
        .fetch_with_retry(config.channel.results, &feed_retry_config())
        .await
        .with_context(|| format!("Failed to fetch channel {}", config.channel.channel_id))
}

fn report_violations(feed: &Feed, config: &DashboardConfig) {
    for violation in validate_series(&feed.samples, &config.layout) {
        warn!("Implausible reading: {}", violation);
    }
}

fn print_snapshot(snapshot: &DashboardSnapshot, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
        println!("{}", text);
    } else {
        println!("{}", snapshot);
    }
    Ok(())
}
