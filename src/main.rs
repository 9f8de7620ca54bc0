use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use epg_reconcile::{
    config::Config,
    equality::{dedup_entities, EqualityLevel},
    ingestor::{load_import_file, BroadcastStore, XmltvImport},
    models::Precedence,
    reconcile::{combine_split_programmes, merge_all, MergeSummary, MidnightOptions},
};

#[derive(Parser)]
#[command(name = "epg-reconcile")]
#[command(version = "0.1.0")]
#[command(about = "Merges imported XMLTV guide data into broadcast-collected EPG schedules")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Which side wins on conflicting programme details (overrides config file)
    #[arg(short = 'p', long, value_name = "broadcast|file")]
    precedence: Option<Precedence>,

    /// Only append imported programmes after the existing schedule ends
    #[arg(short, long)]
    append_only: bool,

    /// Output path for the merged stations (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log level (overrides config file)
    #[arg(short = 'v', long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_from_file(&cli.config)?;

    // Override config with CLI arguments
    if let Some(precedence) = cli.precedence {
        config.merge.precedence = precedence;
    }
    if cli.append_only {
        config.merge.append_only = true;
    }
    if let Some(output) = cli.output {
        config.broadcast.output = output;
    }
    if let Some(log_level) = cli.log_level {
        config.logging.level = log_level;
    }
    config.validate()?;

    // Initialize logging with configured level
    let log_filter = format!("epg_reconcile={}", config.logging.level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EPG reconcile v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", cli.config.display());

    let frequencies = dedup_entities(config.frequencies.clone(), EqualityLevel::Similar);
    if frequencies.len() < config.frequencies.len() {
        info!(
            "Ignoring {} duplicate tuning frequencies",
            config.frequencies.len() - frequencies.len()
        );
    }
    let midnight = MidnightOptions::resolve(&frequencies, config.midnight.enabled);

    let mut store = BroadcastStore::load(&config.broadcast.input).await?;

    // Files load concurrently; merging below stays in configuration order
    let mut tasks = JoinSet::new();
    for (index, import) in config.imports.iter().enumerate() {
        let settings = import.settings()?;
        let path = import.path.clone();
        tasks.spawn(async move { (index, load_import_file(&path, &settings).await) });
    }

    let mut loaded: Vec<Option<XmltvImport>> = config.imports.iter().map(|_| None).collect();
    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(import))) => loaded[index] = Some(import),
            Ok((index, Err(e))) => {
                error!(
                    "Failed to load import {}: {}",
                    config.imports[index].path.display(),
                    e
                );
                failed += 1;
            }
            Err(e) => {
                error!("Import task failed: {}", e);
                failed += 1;
            }
        }
    }

    let base_options = config.merge.options();
    let mut summary = MergeSummary::default();
    for (import_config, import) in config.imports.iter().zip(loaded) {
        let Some(import) = import else {
            continue;
        };
        let options = import_config.merge_options(&base_options);
        info!("Merging {}", import_config.path.display());
        summary.accumulate(&merge_all(&mut store.stations, import.stations, &options));
    }

    if midnight.enabled {
        let combined: usize = store
            .stations
            .iter_mut()
            .map(|station| combine_split_programmes(station, &midnight))
            .sum();
        info!(
            "Combined {} programmes split at midnight ({:?} rule)",
            combined, midnight.rule
        );
    }

    store.save(&config.broadcast.output).await?;

    info!(
        "Reconcile finished: {} channels merged, {} added, {} programmes inserted, {} appended, {} updated, {} discarded",
        summary.channels_merged,
        summary.channels_added,
        summary.programmes.inserted,
        summary.programmes.appended,
        summary.programmes.updated,
        summary.programmes.discarded
    );
    if failed > 0 {
        warn!(
            "{} of {} import files failed to load",
            failed,
            config.imports.len()
        );
    }

    Ok(())
}
