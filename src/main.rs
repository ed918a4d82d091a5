use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_aggregator::{
    config::Config,
    ingestor::{RefreshOrchestrator, SchedulerService},
    query::QueryResolver,
    registry,
    sources::XmltvSourceFetcher,
    store::SnapshotStore,
};

#[derive(Parser)]
#[command(name = "epg-aggregator")]
#[command(version)]
#[command(about = "Aggregates XMLTV programme guides into one queryable snapshot")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path (defaults to $CONFIG_FILE or config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh on the configured interval until interrupted
    Run,
    /// Refresh once and print channels, optionally only the given ids
    Channels { ids: Vec<String> },
    /// Refresh once and print the programmes of one channel
    Programmes { channel_id: String },
    /// Refresh once and print the current guide of one channel
    Guide { channel_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("epg_aggregator={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting EPG aggregator v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load_from_file(path)?;
            info!("Configuration loaded from: {}", path);
            config
        }
        None => Config::load()?,
    };

    let sources = registry::sources_from_config(&config)?;
    info!("Loaded {} EPG sources", sources.len());

    let fetcher = Arc::new(XmltvSourceFetcher::from_config(&config.http)?);
    let store = Arc::new(SnapshotStore::new());
    let orchestrator = Arc::new(RefreshOrchestrator::new(
        fetcher,
        Arc::clone(&store),
        config.refresh.max_concurrent_fetches,
    ));
    let resolver = QueryResolver::new(store, &config.query);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let scheduler = SchedulerService::new(orchestrator, &config.refresh);
            scheduler.start(sources)?;

            tokio::signal::ctrl_c().await?;
            info!("Shutdown signal received");
            scheduler.shutdown().await;
        }
        Command::Channels { ids } => {
            orchestrator.refresh(&sources).await;
            let ids = (!ids.is_empty()).then_some(ids);
            print_json(&resolver.get_channels(ids.as_deref()).await)?;
        }
        Command::Programmes { channel_id } => {
            orchestrator.refresh(&sources).await;
            print_json(&resolver.get_programmes(&channel_id).await)?;
        }
        Command::Guide { channel_id } => {
            orchestrator.refresh(&sources).await;
            print_json(&resolver.get_guide(&channel_id, chrono::Utc::now()).await)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
