//! Specsweep main entry point
//!
//! Command-line interface for the specsweep catalog harvester.

use clap::Parser;
use specsweep::config::{load_config_with_hash, Config};
use specsweep::crawler::{run_harvest, HarvestJob};
use specsweep::storage::{SqliteStateStore, StateStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Specsweep: a resumable device-spec catalog harvester
///
/// Discovers detail-page links from a paginated catalog listing, fetches
/// each page with retry under a bounded worker pool, and appends extracted
/// spec records to a per-manufacturer CSV. Interrupted runs resume without
/// re-fetching completed pages.
#[derive(Parser, Debug)]
#[command(name = "specsweep")]
#[command(version)]
#[command(about = "A resumable device-spec catalog harvester", long_about = None)]
struct Cli {
    /// Manufacturer name; also names the output directory and state store
    #[arg(value_name = "MANUFACTURER")]
    manufacturer: String,

    /// Listing page URL to start discovery from
    #[arg(value_name = "START_URL", required_unless_present = "stats")]
    start_url: Option<String>,

    /// Maximum number of listing pages to visit during discovery
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Path to a TOML configuration file (built-in defaults without one)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Discard persisted state and re-discover from scratch
    #[arg(long, conflicts_with = "stats")]
    fresh: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show persisted progress for the manufacturer and exit
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            tracing::debug!("No configuration file given, using built-in defaults");
            (Config::default(), None)
        }
    };

    if cli.stats {
        return handle_stats(&config, &cli.manufacturer);
    }

    let Some(start_url) = cli.start_url.clone() else {
        anyhow::bail!("START_URL is required unless --stats is given");
    };

    if cli.dry_run {
        return handle_dry_run(&config, &cli.manufacturer, &start_url, cli.max_pages);
    }

    let job = HarvestJob {
        manufacturer: cli.manufacturer,
        start_url,
        max_pages: cli.max_pages,
        fresh: cli.fresh,
        config_hash,
    };

    let summary = run_harvest(&config, &job).await?;

    println!(
        "{}: {} link(s) discovered, {} completed this run, {} failed, {} remaining",
        summary.manufacturer,
        summary.universe,
        summary.completed_this_run,
        summary.failed_this_run,
        summary.remaining
    );

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("specsweep=info,warn"),
            1 => EnvFilter::new("specsweep=debug,info"),
            2 => EnvFilter::new("specsweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(
    config: &Config,
    manufacturer: &str,
    start_url: &str,
    max_pages: Option<u32>,
) -> anyhow::Result<()> {
    println!("=== Specsweep Dry Run ===\n");

    println!("Crawl configuration:");
    println!("  Workers: {}", config.crawl.worker_count);
    println!("  Fetch retries: {}", config.crawl.fetch_retries);
    println!(
        "  Page delay: {}-{}ms",
        config.crawl.page_delay.min_ms, config.crawl.page_delay.max_ms
    );
    println!(
        "  Retry delay: {}-{}ms",
        config.crawl.retry_delay.min_ms, config.crawl.retry_delay.max_ms
    );
    println!(
        "  User-agent pool: {} entries",
        config.session.user_agents.len()
    );

    println!("\nJob:");
    println!("  Manufacturer: {manufacturer}");
    println!("  Start URL: {start_url}");
    match max_pages {
        Some(n) => println!("  Page bound: {n}"),
        None => println!("  Page bound: none"),
    }
    println!(
        "  Output directory: {}/{manufacturer}",
        config.output.data_dir
    );

    print_progress(config, manufacturer)?;

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows persisted progress and exits
fn handle_stats(config: &Config, manufacturer: &str) -> anyhow::Result<()> {
    println!("=== Specsweep Progress: {manufacturer} ===\n");
    print_progress(config, manufacturer)?;
    Ok(())
}

/// Prints persisted universe/completed/remaining counts, if any exist
fn print_progress(config: &Config, manufacturer: &str) -> anyhow::Result<()> {
    let db_path = PathBuf::from(&config.output.data_dir)
        .join(manufacturer)
        .join("state.db");

    if !db_path.exists() {
        println!("\nNo persisted state for {manufacturer} yet");
        return Ok(());
    }

    let store = SqliteStateStore::open(&db_path)?;
    let state = store.load_state()?;

    println!("\nPersisted state:");
    println!("  Universe: {} link(s)", state.universe().len());
    println!("  Completed: {} link(s)", state.completed().len());
    println!("  Remaining: {} link(s)", state.remaining().len());

    if let Some(start_url) = store.get_meta("start-url")? {
        println!("  Discovered from: {start_url}");
    }
    if let Some(hash) = store.get_meta("config-hash")? {
        println!("  Config hash: {hash}");
    }

    Ok(())
}
