//! Site-Harvest main entry point
//!
//! This is the command-line interface for the Site-Harvest documentation crawler.

use anyhow::Context;
use clap::Parser;
use site_harvest::config::{load_config_with_hash, validate, Config};
use site_harvest::output::print_summary;
use site_harvest::Fetcher;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Harvest: a polite documentation-site crawler
///
/// Site-Harvest crawls one documentation site while respecting robots.txt,
/// optionally negotiating the preferred language version of every page, and
/// saves each page as an HTML file under `<output>/crawl/<host>/`.
#[derive(Parser, Debug)]
#[command(name = "site-harvest")]
#[command(version)]
#[command(about = "A polite documentation-site crawler", long_about = None)]
struct Cli {
    /// Start URL (https:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output base directory (pages are written to <DIR>/crawl)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum link depth from the start URL
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Preferred locales in priority order; enables locale-aware crawling
    #[arg(long, value_name = "LOCALES", value_delimiter = ',')]
    locale: Option<Vec<String>>,

    /// Query parameter carrying the locale (e.g. hl); enables locale-aware crawling
    #[arg(long, value_name = "NAME")]
    locale_param: Option<String>,

    /// Delay between requests to the same origin, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.url);
        return Ok(());
    }

    handle_crawl(config, &cli.url, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_harvest=info,warn"),
            1 => EnvFilter::new("site_harvest=debug,info"),
            2 => EnvFilter::new("site_harvest=trace,debug"),
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

/// Applies command-line flags on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(output) = &cli.output {
        config.output.base_dir = output.display().to_string();
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.crawler.politeness_delay_ms = delay_ms;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(locales) = &cli.locale {
        config.locale.enabled = true;
        config.locale.priority = locales
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }
    if let Some(param) = &cli.locale_param {
        config.locale.enabled = true;
        config.locale.param_name = Some(param.clone());
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, url: &str) {
    println!("=== Site-Harvest Dry Run ===\n");

    println!("Target: {}", url);

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Page timeout: {}s", config.crawler.page_timeout_secs);
    println!("  Probe timeout: {}s", config.crawler.probe_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nLocale:");
    if config.locale.enabled {
        let locale = site_harvest::LocaleConfig::from(&config.locale);
        println!("  Priority: {}", locale.effective_priority().join(", "));
        match locale.query_param() {
            Some(param) => println!("  Mode: query parameter '{}'", param),
            None => println!("  Mode: path prefix"),
        }
    } else {
        println!("  Disabled");
    }

    println!("\nOutput:");
    println!("  Directory: {}/crawl", config.output.base_dir);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, url: &str, quiet: bool) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(config);

    let cancel = fetcher.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let summary = fetcher
        .fetch(url)
        .await
        .with_context(|| format!("crawl of {} failed", url))?;

    if !quiet {
        println!();
        print_summary(&summary);
    }

    Ok(())
}
