//! WebScan crawler main entry point
//!
//! This is the command-line interface for the WebScan page and form crawler.

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use webscan_crawler::config::{read_config, validate, Config};
use webscan_crawler::crawler::Coordinator;
use webscan_crawler::output::{default_results_path, print_statistics, save_results, CrawlStatistics};
use webscan_crawler::parse_start_url;

/// WebScan crawler: maps the pages and forms of a web application
///
/// The crawler starts at one URL, follows same-origin links breadth-first up
/// to a depth and page limit, respects robots.txt and a politeness delay, and
/// writes every page it recorded to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "webscan-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite page and form crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from (overrides the config file)
    #[arg(value_name = "START_URL")]
    start_url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from the start URL
    #[arg(long, value_name = "N")]
    depth: Option<u32>,

    /// Maximum number of pages to record
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Seconds between requests to the same origin
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Complete User-Agent header value
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Follow links to other origins
    #[arg(long)]
    allow_external: bool,

    /// Number of concurrent crawl workers
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Stop the crawl after this many seconds and keep the partial results
    #[arg(long, value_name = "SECONDS")]
    deadline: Option<f64>,

    /// Results file (default: <output-dir>/scan_results_<site>.json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate the configuration and print it without crawling
    #[arg(long)]
    dry_run: bool,

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

    let mut config = match &cli.config {
        Some(path) => read_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);

    setup_logging(cli.verbose, cli.quiet, config.output.log_file.as_deref())?;

    validate(&config).context("Invalid configuration")?;
    let start = parse_start_url(&config.crawler.start_url)?;

    let results_path = cli
        .output
        .clone()
        .or_else(|| config.output.results_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| default_results_path(&config.output.output_dir, &start));

    if cli.dry_run {
        handle_dry_run(&config, &results_path);
        return Ok(());
    }

    let deadline = match cli.deadline {
        Some(secs) => match Duration::try_from_secs_f64(secs) {
            Ok(deadline) => Some(deadline),
            Err(_) => bail!("--deadline must be a non-negative number of seconds"),
        },
        None => None,
    };

    handle_crawl(config, results_path, deadline, cli.quiet).await
}

/// Folds command-line flags into the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(start_url) = &cli.start_url {
        config.crawler.start_url = start_url.clone();
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(delay) = cli.delay {
        config.crawler.delay = delay;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent.custom = Some(user_agent.clone());
    }
    if cli.allow_external {
        config.crawler.allow_external = true;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr, or are appended to `log_file` when one is configured.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webscan_crawler=info,warn"),
            1 => EnvFilter::new("webscan_crawler=debug,info"),
            2 => EnvFilter::new("webscan_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, results_path: &std::path::Path) {
    println!("=== WebScan Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Delay: {}s", config.crawler.delay);
    println!("  Allow external: {}", config.crawler.allow_external);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout);
    println!("  robots.txt timeout: {}s", config.crawler.robots_timeout);
    println!("  Honor Crawl-delay: {}", config.crawler.honor_crawl_delay);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Results: {}", results_path.display());
    if let Some(log_file) = &config.output.log_file {
        println!("  Log file: {}", log_file);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    results_path: PathBuf,
    deadline: Option<Duration>,
    quiet: bool,
) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config).context("Failed to start crawl")?;
    let token = coordinator.cancellation_token();

    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            interrupt.cancel();
        }
    });

    if let Some(deadline) = deadline {
        let expired = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            tracing::warn!("Deadline of {:?} reached, stopping crawl", deadline);
            expired.cancel();
        });
    }

    let started_at = Utc::now();
    let results = coordinator.run().await;
    let finished_at = Utc::now();

    save_results(&results, &results_path)
        .with_context(|| format!("Failed to write results to {}", results_path.display()))?;

    if !quiet {
        let stats = CrawlStatistics::from_results(&results, started_at, finished_at);
        print_statistics(&stats);
        println!();
    }

    println!(
        "Crawled {} pages. Output: {}",
        results.len(),
        results_path.display()
    );

    Ok(())
}
