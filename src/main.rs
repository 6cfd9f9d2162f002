//! Polite Crawler main entry point
//!
//! This is the command-line interface for the polite single-site crawler.

use anyhow::Context;
use clap::Parser;
use polite_crawler::config::{load_config, Config};
use polite_crawler::output::print_summary;
use polite_crawler::Crawler;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Polite Crawler: crawls one site without wearing out its welcome
///
/// Polite Crawler honors robots.txt for every token of its user agent,
/// slows down when the server asks it to, visits each URL once and stops
/// after a fixed maximum runtime.
#[derive(Parser, Debug)]
#[command(name = "polite-crawler")]
#[command(version)]
#[command(about = "A polite single-site web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("polite_crawler=info,warn"),
            1 => EnvFilter::new("polite_crawler=debug,info"),
            2 => EnvFilter::new("polite_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved settings
fn handle_dry_run(config: &Config) {
    println!("=== Polite Crawler Dry Run ===\n");

    println!("Crawl:");
    println!("  Website: {}", config.crawl.website);
    println!("  User agent: {}", config.crawl.user_agent);
    println!("  Max runtime: {}s", config.crawl.max_runtime_secs);
    println!("  Initial delay: {}s", config.crawl.initial_delay_secs);
    println!("  Delay step: {}ms", config.crawl.delay_step_ms);
    println!("  Honor Crawl-delay: {}", config.crawl.honor_crawl_delay);

    println!("\nEngine:");
    println!("  Parallelism: {}", config.engine.parallelism);
    println!("  Request timeout: {}s", config.engine.request_timeout_secs);
    println!(
        "  Allowed domains ({}):",
        config.engine.allowed_domains.len()
    );
    for pattern in &config.engine.allowed_domains {
        println!("  - {}", pattern);
    }

    println!(
        "\nBanned extensions: {}",
        config.filters.banned_extensions.join(" ")
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let profile = config
        .into_profile()
        .on_response(|response| {
            tracing::info!(
                "Fetched {} [{}] {} bytes",
                response.url,
                response.status.as_u16(),
                response.body.len()
            );
        })
        .on_url(|url| tracing::debug!("Discovered {}", url));

    tracing::info!("Starting crawl of {}", profile.website);

    match Crawler::new(profile).run().await {
        Ok(summary) => {
            tracing::info!("Crawl completed successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
