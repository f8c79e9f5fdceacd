//! github-search-crawler main entry point
//!
//! This is the command-line interface for the GitHub search crawler.

use anyhow::Context;
use clap::Parser;
use github_search_crawler::config::{load_params_with_hash, load_settings, DEFAULT_PARAMS_PATH};
use github_search_crawler::crawler::{run_crawl, CrawlSession};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// github-search-crawler: scrape one GitHub search results page into JSON
///
/// Reads keywords, a search type (Repositories, Issues or Wikis) and an
/// optional proxy list from a JSON parameters file, searches GitHub, and
/// writes the result URLs (with owner and language stats for repositories)
/// to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "github-search-crawler")]
#[command(version)]
#[command(about = "Scrape one GitHub search results page into JSON", long_about = None)]
struct Cli {
    /// Path to the JSON parameters file
    #[arg(value_name = "PARAMS", default_value = DEFAULT_PARAMS_PATH)]
    params: PathBuf,

    /// Path of the JSON output file (overrides the settings file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to a TOML settings file
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    debug: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Validate inputs and show the search that would run, without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.settings.as_deref()).context("Failed to load settings")?;

    // Setup logging from the single debug flag
    setup_logging(cli.debug || settings.debug, cli.quiet);

    tracing::info!("Loading parameters from: {}", cli.params.display());
    let (config, params_hash) = match load_params_with_hash(&cli.params) {
        Ok((cfg, hash)) => {
            tracing::info!("Parameters loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load parameters: {}", e);
            return Err(e).context("Parameter validation failed");
        }
    };

    if cli.dry_run {
        let session = CrawlSession::new(config, settings.crawler.clone())?;
        println!("=== github-search-crawler dry run ===\n");
        println!("Parameters hash: {}", params_hash);
        println!("Search type: {}", session.config().search_type);
        println!("Search URL: {}", session.search_url()?);
        println!("Proxies ({}):", session.config().proxies.len());
        for proxy in &session.config().proxies {
            println!("  - {}", proxy);
        }
        return Ok(());
    }

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&settings.output.path));

    match run_crawl(config, &settings, &output).await {
        Ok(count) => {
            tracing::info!("Crawl completed successfully: {} items written", count);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("Crawl failed")
        }
    }
}

/// Sets up the logging/tracing subscriber
fn setup_logging(debug: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if debug {
        EnvFilter::new("github_search_crawler=debug,info")
    } else {
        EnvFilter::new("github_search_crawler=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
