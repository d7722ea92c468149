//! WikiTally - Concurrent Wikipedia Word-Distribution Counter
//!
//! A CLI tool that fetches the Wikipedia page for every topic in a list,
//! counts word frequencies per topic, and writes one sparse topic×word
//! table.
//!
//! Exit codes:
//!   0 - Run completed (per-topic failures are reported, not fatal)
//!   1 - Fatal error (invalid arguments, unreadable topic file,
//!       unwritable output)

mod cli;
mod config;
mod fetcher;
mod models;
mod output;
mod pipeline;
mod table;
mod tokenize;
mod topics;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use fetcher::{PageClient, RetryPolicy};
use models::RunSummary;
use output::TallyMetadata;
use pipeline::PipelineSettings;
use std::sync::Arc;
use table::DistributionTable;
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

    // Initialize logging
    init_logging(&args);

    info!("WikiTally v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the tally
    match run_tally(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Tally failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .wikitally.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".wikitally.toml");

    if path.exists() {
        eprintln!("⚠️  .wikitally.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .wikitally.toml")?;

    println!("✅ Created .wikitally.toml with default settings.");
    println!("   Edit it to customize the API endpoint, pool size, and retry bounds.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete tally workflow. Returns exit code (0 or 1).
async fn run_tally(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Read the topic list
    println!("📖 Reading topics from: {}", args.topics.display());
    let (topic_list, source_failed) = match topics::read_topic_file(&args.topics) {
        Ok(topic_list) => (topic_list, false),
        Err(e) => {
            // Fatal to the run, but a diagnostic and an empty result
            // rather than a crash.
            error!("Topic source failed: {}", e);
            eprintln!("❌ Error: {}", e);
            (Vec::new(), true)
        }
    };
    info!("Loaded {} topics", topic_list.len());

    // Handle --dry-run: list topics and exit
    if args.dry_run {
        let code = handle_dry_run(&topic_list)?;
        return Ok(if source_failed { 1 } else { code });
    }

    if topic_list.is_empty() {
        warn!("No topics to process; the output table will be empty");
    }

    // Step 2: Build the page client
    println!("🌐 Fetching from: {}", config.fetcher.api_url);
    println!(
        "   Workers: {} ({:?} pool) | Retries: {} attempts, {}-{}s backoff",
        config.general.workers,
        args.mode,
        config.retry.max_attempts,
        config.retry.min_delay_secs,
        config.retry.max_delay_secs
    );

    let client = Arc::new(PageClient::new(&config.fetcher)?);

    // Step 3: Run the fetch-and-aggregate pipeline
    println!("\n🔎 Counting words for {} topics...\n", topic_list.len());

    let table = Arc::new(DistributionTable::new(&topic_list));
    let settings = PipelineSettings {
        workers: config.general.workers,
        mode: args.mode,
        retry: RetryPolicy::from(&config.retry),
        show_progress: !args.quiet,
    };

    let fetch = {
        let client = client.clone();
        move |topic: String| {
            let client = client.clone();
            async move { client.fetch_once(&topic).await }
        }
    };

    let (reports, elapsed) =
        pipeline::timed(pipeline::run(topic_list, table.clone(), settings, fetch)).await;
    let reports = reports?;

    // Step 4: Freeze the table and serialize it
    let frozen = Arc::try_unwrap(table)
        .map_err(|_| anyhow::anyhow!("aggregation table still shared after the run barrier"))?
        .freeze();
    let summary = RunSummary::from_reports(&reports);

    let contents = match args.format {
        OutputFormat::Csv => output::generate_csv(&frozen),
        OutputFormat::Json => {
            let metadata = TallyMetadata {
                api_url: config.fetcher.api_url.clone(),
                generated_at: Utc::now(),
                summary: summary.clone(),
                duration_seconds: elapsed.as_secs_f64(),
            };
            output::generate_json(&frozen, &metadata)?
        }
    };

    std::fs::write(&args.output, &contents)
        .with_context(|| format!("Failed to write output to {}", args.output.display()))?;

    // Print summary
    println!("\n📊 Tally Summary:");
    println!("   Topics: {}", summary.total);
    println!(
        "   - ✅ Counted: {} | ❓ Not found: {} | ⏳ Retries exhausted: {} | ⛔ Transport: {}",
        summary.counted, summary.not_found, summary.retries_exhausted, summary.transport_failed
    );
    println!("   Distinct words: {}", frozen.columns().len());
    println!("   Duration: {:.1}s", elapsed.as_secs_f64());

    if summary.has_failures() && !args.quiet {
        println!("\n   Topics without counts:");
        for report in reports.iter().filter(|r| !r.outcome.is_counted()) {
            println!("     {} {}: {}", report.outcome.emoji(), report.topic, report.outcome);
        }
    }

    println!(
        "\n✅ Word distribution saved to: {}",
        args.output.display()
    );

    Ok(if source_failed { 1 } else { 0 })
}

/// Handle --dry-run: list the topics that would be fetched, exit.
fn handle_dry_run(topic_list: &[String]) -> Result<i32> {
    println!("\n🔍 Dry run: listing topics (no fetches)...\n");

    if topic_list.is_empty() {
        println!("   No topics found.");
    } else {
        for topic in topic_list {
            println!("     📄 {}", topic);
        }
        println!("\n   Total: {} topics", topic_list.len());
    }

    println!("\n✅ Dry run complete. No pages were fetched.");
    Ok(0)
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
            info!("Loaded default config from .wikitally.toml");
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
