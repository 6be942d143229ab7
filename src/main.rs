//! Lexicrawl main entry point
//!
//! This is the command-line interface for the Lexicrawl vocabulary crawler.

use anyhow::Context;
use clap::Parser;
use lexicrawl::config::{load_config_with_hash, Config, StorageBackend};
use lexicrawl::crawler::crawl;
use lexicrawl::output::{print_ledger_summary, print_statistics};
use lexicrawl::seeds::{load_topics, Topic};
use lexicrawl::storage;
use lexicrawl::url::Canonicalizer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lexicrawl: a polite, resumable vocabulary crawler
///
/// Lexicrawl crawls pages under each seed URL's prefix while honoring
/// robots.txt, extracts vocabulary from every page, and records progress so
/// later runs pick up where earlier ones stopped.
#[derive(Parser, Debug)]
#[command(name = "lexicrawl")]
#[command(version = "1.0.0")]
#[command(about = "A polite, resumable vocabulary crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Directory of <topic>.txt seed files
    #[arg(long, value_name = "DIR", default_value = "seeds")]
    seeds_dir: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and seeds and show what would be crawled
    #[arg(long, conflicts_with_all = ["stats", "rebuild_mapping"])]
    dry_run: bool,

    /// Show ledger statistics and exit
    #[arg(long, conflicts_with_all = ["dry_run", "rebuild_mapping"])]
    stats: bool,

    /// Add missing id mapping entries for every visited URL and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    rebuild_mapping: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.stats {
        handle_stats(&config)
    } else if cli.rebuild_mapping {
        handle_rebuild_mapping(&config)
    } else {
        let topics = load_topics(&cli.seeds_dir)
            .with_context(|| format!("failed to load seeds from {}", cli.seeds_dir.display()))?;
        if cli.dry_run {
            handle_dry_run(&config, &topics);
            Ok(())
        } else {
            handle_crawl(config, &topics).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lexicrawl=info,warn"),
            1 => EnvFilter::new("lexicrawl=debug,info"),
            2 => EnvFilter::new("lexicrawl=trace,debug"),
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

/// Handles the --dry-run mode: shows configuration and canonical seeds
fn handle_dry_run(config: &Config, topics: &[Topic]) {
    println!("=== Lexicrawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages per seed: {}", config.crawler.max_pages);
    println!("  Max attempts per URL: {}", config.crawler.max_retries);
    println!("  Base backoff: {}ms", config.crawler.base_backoff_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!(
        "  Jitter: {}-{}ms",
        config.crawler.jitter_min_ms, config.crawler.jitter_max_ms
    );
    println!("  Excluded patterns: {:?}", config.crawler.exclude_patterns);
    println!(
        "  Honor robots.txt Disallow: {}",
        config.crawler.respect_robots_disallow
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.output_dir);
    if config.output.backend == StorageBackend::Sqlite {
        println!("  Database: {}", storage::database_path(&config.output).display());
    }
    println!("  Extractor: {:?}", config.extractor.mode);

    let canonicalizer = Canonicalizer::new(&config.crawler.exclude_patterns);
    let mut valid = 0;
    println!("\nTopics ({}):", topics.len());
    for topic in topics {
        println!("  - {} ({} seeds)", topic.name, topic.seeds.len());
        for seed in &topic.seeds {
            match canonicalizer.canonicalize(seed) {
                Ok(url) => {
                    valid += 1;
                    println!("    * {}", url);
                }
                Err(e) => println!("    ! {} ({})", seed, e),
            }
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", valid);
}

/// Handles the --stats mode: shows the size of the existing ledger
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let summary = storage::summarize(&config.output).context("failed to read ledger")?;
    print_ledger_summary(&summary);
    Ok(())
}

/// Handles the --rebuild-mapping mode
fn handle_rebuild_mapping(config: &Config) -> anyhow::Result<()> {
    let added = storage::rebuild_mapping(&config.output).context("failed to rebuild mapping")?;
    println!("✓ Added {} id mapping entries", added);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, topics: &[Topic]) -> anyhow::Result<()> {
    let seed_count: usize = topics.iter().map(|t| t.seeds.len()).sum();
    tracing::info!("Topics: {}, seed URLs: {}", topics.len(), seed_count);

    match crawl(config, topics).await {
        Ok(stats) => {
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl aborted: {}", e);
            Err(e).context("crawl aborted")
        }
    }
}
