//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use policytracker_core::{IngestConfig, IngestReport, ProgressReporter, run_ingest};
use policytracker_enrich::GeminiClient;
use policytracker_shared::{
    AppConfig, api_key_from_env, config_file_path, expand_path, init_config, load_config,
};
use policytracker_source::CongressClient;
use policytracker_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// PolicyTracker — legislative bill ingestion and enrichment.
#[derive(Parser)]
#[command(
    name = "policytracker",
    version,
    about = "Ingest recent US bills, enrich them with tags and generated analyses, and store them locally.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run one ingest batch: fetch, enrich, and upsert recent bills.
    Ingest {
        /// Maximum bills to fetch (defaults to the configured batch limit).
        #[arg(short, long)]
        limit: Option<u32>,

        /// Congressional session to ingest (defaults to the configured session).
        #[arg(short, long)]
        congress: Option<u32>,

        /// Database file path (defaults to the configured db path).
        #[arg(long)]
        db: Option<String>,
    },

    /// List all stored bills.
    List {
        /// Database file path.
        #[arg(long)]
        db: Option<String>,
    },

    /// Show one stored bill by its record id.
    Show {
        /// Record id as printed by `list`.
        id: String,

        /// Database file path.
        #[arg(long)]
        db: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "policytracker=info",
        1 => "policytracker=debug",
        _ => "policytracker=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest {
            limit,
            congress,
            db,
        } => cmd_ingest(limit, congress, db.as_deref()).await,
        Command::List { db } => cmd_list(db.as_deref()).await,
        Command::Show { id, db } => cmd_show(&id, db.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Resolve the database path from flag or config.
fn resolve_db_path(config: &AppConfig, db: Option<&str>) -> PathBuf {
    match db {
        Some(path) => expand_path(path),
        None => expand_path(&config.defaults.db_path),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(limit: Option<u32>, congress: Option<u32>, db: Option<&str>) -> Result<()> {
    let config = load_config()?;

    // Fail fast before opening anything if either key is missing.
    let congress_key = api_key_from_env(&config.congress.api_key_env)?;
    let gemini_key = api_key_from_env(&config.gemini.api_key_env)?;

    let limit = limit.unwrap_or(config.defaults.batch_limit);
    let session = congress.unwrap_or(config.defaults.session);

    let source = CongressClient::new(&config.congress.base_url, congress_key, session)?;
    let generator = GeminiClient::new(&config.gemini.base_url, &config.gemini.model, gemini_key)?;

    let db_path = resolve_db_path(&config, db);
    let storage = Storage::open(&db_path).await?;

    info!(limit, session, db = %db_path.display(), "starting ingest run");

    let ingest_config = IngestConfig { limit };
    let reporter = CliProgress::new();
    let report = run_ingest(&ingest_config, &source, &generator, &storage, &reporter).await?;

    println!();
    println!("  Ingest run complete!");
    println!("  Fetched:    {}", report.fetched);
    println!("  Upserted:   {}", report.upserted);
    println!("  Summaries:  {}", report.summaries_generated);
    println!("  Analyses:   {}", report.analyses_generated);
    println!("  Failures:   {}", report.failures);
    println!("  Time:       {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_list(db: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let db_path = resolve_db_path(&config, db);
    let storage = Storage::open(&db_path).await?;

    let bills = storage.list_bills().await?;
    if bills.is_empty() {
        println!("No bills stored yet. Run `policytracker ingest` first.");
        return Ok(());
    }

    for bill in &bills {
        let tags: Vec<&str> = bill.tags.iter().map(|t| t.as_str()).collect();
        let enrichment = match (&bill.easy_summary, &bill.effectiveness_analysis) {
            (Some(_), Some(_)) => "enriched",
            (None, None) => "pending",
            _ => "partial",
        };
        println!(
            "{}  {}{:<6} [{}] ({}) {}",
            bill.id,
            bill.bill_type,
            bill.number,
            tags.join(", "),
            enrichment,
            bill.title,
        );
    }
    println!();
    println!("{} bill(s)", bills.len());

    Ok(())
}

async fn cmd_show(id: &str, db: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let db_path = resolve_db_path(&config, db);
    let storage = Storage::open(&db_path).await?;

    let bill = storage
        .get_bill(id)
        .await?
        .ok_or_else(|| eyre!("no bill with id '{id}'"))?;

    let tags: Vec<&str> = bill.tags.iter().map(|t| t.as_str()).collect();

    println!("{} {} ({}th Congress)", bill.bill_type, bill.number, bill.congress);
    println!("Title:        {}", bill.title);
    println!("Tags:         {}", tags.join(", "));
    println!("Last updated: {}", bill.last_updated.to_rfc3339());
    if let Some(action) = &bill.latest_action {
        println!("Latest action: {action}");
    }
    println!();
    match &bill.easy_summary {
        Some(summary) => println!("Summary:\n{summary}\n"),
        None => println!("Summary: (not yet generated)\n"),
    }
    match &bill.effectiveness_analysis {
        Some(analysis) => println!("Effectiveness analysis:\n{analysis}"),
        None => println!("Effectiveness analysis: (not yet generated)"),
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let path = config_file_path()?;
    println!("# {}", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn bill_started(&self, key: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Processing [{current}/{total}] {key}"));
    }

    fn done(&self, _report: &IngestReport) {
        self.spinner.finish_and_clear();
    }
}
