//! AdStats - classified-ad listing counts by country
//!
//! A CLI tool that pulls listing metadata from a classifieds API for each
//! configured country and prints totals, per-state counts and per-category
//! counts as JSON or CSV.
//!
//! Exit codes:
//!   0 - Success (sources that could not be fetched render as empty)
//!   1 - Runtime error (bad arguments, config, output file, etc.)

mod aggregator;
mod cli;
mod config;
mod fetch;
mod models;
mod report;

use aggregator::Aggregator;
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use fetch::LocationFetcher;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("AdStats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .adstats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings. Logs go to stderr.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Fetch every source and emit the rendered counts.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if config.sources.is_empty() {
        warn!("No sources configured; output will be empty");
    }

    let fetcher = LocationFetcher::new(&config.fetch)?;
    let mut aggregator = Aggregator::new(fetcher);
    for source in &config.sources {
        aggregator.add_source(source.id.as_str(), source.url.as_str());
    }
    for id in &args.skip {
        if !aggregator.remove_source(id) {
            warn!("--skip {}: no such source", id);
        }
    }
    for (id, location) in aggregator.sources() {
        debug!("Source {} -> {}", id, location);
    }

    aggregator.set_limits(config.limits.max_states, config.limits.max_categories);
    debug!("Limits: {:?}", aggregator.limits());

    aggregator.refresh().await;

    let empty = aggregator
        .results()
        .values()
        .filter(|result| result.is_empty())
        .count();
    if empty > 0 {
        warn!("{} of {} sources returned no data", empty, aggregator.results().len());
    }

    let country = config.general.country.as_str();
    if !country.is_empty() && aggregator.result(country).is_none() {
        warn!("Country {} is not a configured source", country);
    }

    let output = aggregator.render(country, config.general.format);

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, format!("{}\n", output))
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output saved to {}", path.display());
        }
        None => println!("{}", output),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
