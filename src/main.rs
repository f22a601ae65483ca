//! ChatStats - Year-in-Review for Chat Conversation Archives
//!
//! A CLI tool that ingests an exported conversation-history archive
//! (JSON) and generates a statistics report: KPIs with year-over-year
//! comparison, monthly and daily activity, model usage, and title
//! word frequencies.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable archive, malformed top level, bad config)

mod analysis;
mod archive;
mod cli;
mod config;
mod ingest;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use cli::{Args, OutputFormat};
use config::Config;
use models::{NormalizedRow, Report, ReportMetadata, TimeWindow};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
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

    info!("ChatStats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the report pipeline
    match run_report(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .chatstats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".chatstats.toml");

    if path.exists() {
        eprintln!("⚠️  .chatstats.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .chatstats.toml")?;

    println!("✅ Created .chatstats.toml with default settings.");
    println!("   Edit it to customize output, word filtering, and report sections.");
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

/// Run the complete report pipeline. Returns exit code.
fn run_report(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input = args.input_path().to_path_buf();

    // Step 1: Read and decode the archive
    println!("📥 Reading archive: {}", input.display());
    let records = archive::read_archive(&input)?;
    info!("Archive contains {} records", records.len());

    // Step 2: Normalize into the conversation table (once per archive)
    println!("🧾 Normalizing {} conversation records...", records.len());
    let rows = ingest::normalize(records);
    let records_dated = rows.iter().filter(|r| r.create_time.is_some()).count();
    debug!(
        "Normalized {} rows ({} dated, {} undated)",
        rows.len(),
        records_dated,
        rows.len() - records_dated
    );

    // Handle --dry-run: summarize the table and exit
    if args.dry_run {
        return handle_dry_run(&rows);
    }

    // Step 3: Aggregate the summary tables
    let scope_year = args.year.unwrap_or_else(|| Utc::now().year());
    let window = TimeWindow::calendar_year(scope_year).context("Scope year out of range")?;
    let baseline =
        TimeWindow::calendar_year(scope_year - 1).context("Baseline year out of range")?;

    println!(
        "📊 Aggregating statistics for {} (baseline {})...",
        scope_year,
        scope_year - 1
    );

    let kpis = analysis::kpi_comparison(&rows, &window, &baseline);
    let monthly = analysis::monthly_counts(&rows, config.report.group_monthly_by_model);

    let daily = if config.report.include_daily_activity {
        analysis::daily_counts(&rows, scope_year)
    } else {
        BTreeMap::new()
    };

    let models = if config.report.include_model_breakdown {
        analysis::model_distribution(&rows)
    } else {
        Vec::new()
    };

    let words = if config.report.include_word_frequencies {
        let titles: Vec<&str> = rows.iter().filter_map(|r| r.title.as_deref()).collect();
        let mut words = analysis::word_frequencies(&titles, config.words.min_length);
        words.truncate(config.words.top);
        words
    } else {
        Vec::new()
    };

    // Step 4: Build and render the report
    println!("📝 Generating report...");

    let metadata = ReportMetadata {
        archive: input.display().to_string(),
        generated_at: Utc::now(),
        scope_year,
        records_total: rows.len(),
        records_dated,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let report = Report {
        metadata,
        kpis,
        monthly,
        daily,
        models,
        words,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    let summary = &report.kpis.current;
    println!("\n📊 Report Summary:");
    println!(
        "   Conversations in {}: {}",
        scope_year, summary.total_conversations
    );
    println!(
        "   Avg messages per conversation: {:.1}",
        summary.avg_messages
    );
    println!("   Voice conversations: {}", summary.voice_count);
    if !report.daily.is_empty() {
        println!("   Active days: {}", report.daily.len());
    }
    println!(
        "   Duration: {:.1}s",
        report.metadata.duration_seconds
    );
    println!(
        "\n✅ Report complete! Saved to: {}",
        output_path.display()
    );

    Ok(0)
}

/// Handle --dry-run: print a normalization summary, no report.
fn handle_dry_run(rows: &[NormalizedRow]) -> Result<i32> {
    println!("\n🔍 Dry run: normalization summary (no report written)...\n");

    if rows.is_empty() {
        println!("   Archive contains no records.");
    } else {
        let dated = rows.iter().filter(|r| r.create_time.is_some()).count();
        let voice = rows.iter().filter(|r| r.has_voice).count();
        let messages: usize = rows.iter().map(|r| r.message_count).sum();
        let model_count = rows
            .iter()
            .filter_map(|r| r.model_slug.as_deref())
            .collect::<HashSet<_>>()
            .len();

        println!("   Records: {}", rows.len());
        println!(
            "   With timestamps: {} ({} undated)",
            dated,
            rows.len() - dated
        );
        println!("   Voice conversations: {}", voice);
        println!("   Total messages: {}", messages);
        println!("   Distinct models: {}", model_count);

        let first = rows.iter().filter_map(|r| r.create_time).min();
        let last = rows.iter().filter_map(|r| r.create_time).max();
        if let (Some(first), Some(last)) = (first, last) {
            println!("   Date range: {} .. {}", first.date_naive(), last.date_naive());
        }
    }

    println!("\n✅ Dry run complete. No report was written.");
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
            info!("Loaded default config from .chatstats.toml");
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
