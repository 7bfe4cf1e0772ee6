//! LeadScout CLI
//!
//! Collect local business leads from Google Maps and merge the exported CSVs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use dialoguer::Input;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use leadscout_core::collect::{LeadClassifier, LeadCollector};
use leadscout_core::config::Config;
use leadscout_core::export::{output_path, CsvExporter, CsvMerger, MergeStats};
use leadscout_core::models::WebsiteFilter;
use leadscout_core::monitoring::{ApiGate, Sleeper, ThreadSleeper};
use leadscout_core::services::{GeocodeService, MapsApi, PlaceDetailsService, PlacesSearchService};

#[derive(Parser)]
#[command(name = "leadscout")]
#[command(about = "LeadScout - Collect local business leads from Google Maps")]
#[command(long_about = "LeadScout geocodes an area, runs a Places text search for a keyword,
fetches details for every place found and writes two CSVs: businesses with a
website and businesses without one.

Requests are throttled by a sliding-window rate limiter (per minute and per day)
and every billable call is added to a per-session cost estimate.

QUICK START:
  1. Put GOOGLE_MAPS_API_KEY=... in .env or the environment
  2. Collect:  leadscout collect --area \"Luton, UK\" --keyword \"hairdresser\"
  3. Merge:    leadscout merge --pattern \"lu*_hairdresser_*.csv\" --output merged.csv

OUTPUT FILES:
  {area}_{keyword}_with_website.csv
  {area}_{keyword}_without_website.csv
  Columns: name, address, phone, website, google_maps_url, rating,
           user_ratings_total, place_id")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/leadscout/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging. RUST_LOG takes precedence when set.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect leads for one area and keyword and export them as CSV
    Collect(CollectArgs),
    /// Merge exported CSVs, removing duplicate places
    Merge(MergeArgs),
    /// Show or initialize the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
struct CollectArgs {
    /// Area to search, e.g. "Luton, UK" or a postcode district (prompted if omitted)
    #[arg(long)]
    area: Option<String>,
    /// Business type to search for, e.g. "eyelash extensions" (prompted if omitted)
    #[arg(long)]
    keyword: Option<String>,
    /// Search radius in meters (default: search.default_radius)
    #[arg(long)]
    radius: Option<u32>,
    /// Maximum number of places to fetch (default: search.default_max_results)
    #[arg(long)]
    max_results: Option<usize>,
    /// Directory for the CSV files (default: general.output_dir)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["pattern", "files", "categories"])
))]
struct MergeArgs {
    /// Glob pattern relative to the base directory, e.g. "lu*_hairdresser_*.csv"
    #[arg(long)]
    pattern: Option<String>,
    /// Explicit list of CSV files, merged in order
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,
    /// Categories (keywords) to merge; requires --postcodes
    #[arg(long, num_args = 1.., requires = "postcodes")]
    categories: Vec<String>,
    /// Postcodes (areas) to merge the categories across
    #[arg(long, num_args = 1.., requires = "categories")]
    postcodes: Vec<String>,
    /// Output CSV path
    #[arg(long)]
    output: PathBuf,
    /// Directory searched by --pattern and --categories (default: general.output_dir)
    #[arg(long)]
    base_dir: Option<PathBuf>,
    /// Column used to detect duplicates
    #[arg(long, default_value = "place_id")]
    dedupe_field: String,
    /// Only merge one half of the exports (with --categories)
    #[arg(long)]
    website_filter: Option<WebsiteFilter>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        for line in error_report(&e) {
            eprintln!("{}", line);
        }
        std::process::exit(1);
    }
}

/// Lines printed for a failed command: the error chain, then the core error
/// code, a hint and a note when the session cannot continue
fn error_report(e: &anyhow::Error) -> Vec<String> {
    let mut lines = vec![format!("\n❌ {:#}", e)];
    if let Some(err) = e.downcast_ref::<leadscout_core::Error>() {
        lines.push(format!("   code: {}", err.code()));
        if let Some(hint) = err.action_hint() {
            lines.push(format!("   {}", hint));
        }
        if err.is_fatal_for_session() {
            lines.push("   No further requests can be made this session.".to_string());
        }
    }
    lines
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    // Init must work even when the existing file does not parse
    if let Commands::Config {
        command: ConfigCommands::Init { force },
    } = &cli.command
    {
        return config_init(&config_path, *force);
    }

    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    init_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Collect(args) => collect(&config, args),
        Commands::Merge(args) => merge(&config, args),
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                println!("# {}", config_path.display());
                print!("{}", config.to_toml()?);
                Ok(())
            }
            ConfigCommands::Init { force } => config_init(&config_path, force),
        },
    }
}

fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    let default_level = if verbose {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = match &config.general.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .context("general.log_file must name a file")?;
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::NEVER, dir, name);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(appender)
                    .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

// ============================================================================
// Collect
// ============================================================================

fn collect(config: &Config, args: CollectArgs) -> Result<()> {
    let area = match args.area {
        Some(area) => area,
        None => Input::new()
            .with_prompt("Area to search (e.g. 'Luton, UK')")
            .interact_text()?,
    };
    let keyword = match args.keyword {
        Some(keyword) => keyword,
        None => Input::new()
            .with_prompt("Business type (e.g. 'eyelash extensions')")
            .interact_text()?,
    };
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.general.output_dir.clone());

    let api_key = config.api.resolve_api_key()?;
    let gate = ApiGate::from_config(config);
    let api = MapsApi::from_config(&config.api, api_key, gate.clone())?;
    let sleeper: Arc<dyn Sleeper> = Arc::new(ThreadSleeper);

    let collector = LeadCollector::new(
        GeocodeService::new(api.clone()),
        PlacesSearchService::new(api.clone(), config.search.clone(), sleeper.clone()),
        PlaceDetailsService::new(api, config.search.clone(), sleeper),
    );

    println!("\n🔎 Searching for '{}' in '{}'...\n", keyword, area);
    let leads = match collector.collect_leads(&area, &keyword, args.radius, args.max_results) {
        Ok(leads) => leads,
        Err(e) => {
            // What was spent before the failure is still worth seeing
            print_session_report(&gate);
            return Err(e.into());
        }
    };

    let (with_website, without_website) = LeadClassifier::new().split_by_website(leads);
    let exporter = CsvExporter::new();

    println!("\n📊 Results:");
    println!("  Businesses with website:    {}", with_website.len());
    println!("  Businesses without website: {}", without_website.len());
    println!("  Total:                      {}", with_website.len() + without_website.len());

    for (filter, leads) in [
        (WebsiteFilter::WithWebsite, &with_website),
        (WebsiteFilter::WithoutWebsite, &without_website),
    ] {
        let path = output_path(&output_dir, &area, &keyword, filter);
        if exporter.export(&path, leads)? > 0 {
            println!("  ✅ {}", path.display());
        }
    }
    if with_website.is_empty() && without_website.is_empty() {
        warn!("No leads found for '{}' in '{}'", keyword, area);
    }

    print_session_report(&gate);
    Ok(())
}

fn print_session_report(gate: &ApiGate) {
    if let Some(costs) = gate.costs() {
        println!("\n{}", costs.summary());
    }
    if let Some(limiter) = gate.limiter() {
        let usage = limiter.current_usage();
        println!("⏱  Rate limit usage:");
        println!(
            "  Last minute: {}/{} ({:.1}%)",
            usage.requests_last_minute, usage.minute_limit, usage.minute_usage_percent
        );
        println!(
            "  Today:       {}/{} ({:.1}%)",
            usage.requests_today, usage.day_limit, usage.day_usage_percent
        );
    }
}

// ============================================================================
// Merge
// ============================================================================

fn merge(config: &Config, args: MergeArgs) -> Result<()> {
    let merger = CsvMerger::new(args.dedupe_field);
    let base_dir = args
        .base_dir
        .unwrap_or_else(|| config.general.output_dir.clone());

    let stats: MergeStats = if let Some(pattern) = &args.pattern {
        merger.merge_by_pattern(pattern, &args.output, &base_dir)?
    } else if !args.files.is_empty() {
        merger.merge_files(&args.files, &args.output)?
    } else {
        merger.merge_categories(
            &args.categories,
            &args.postcodes,
            &args.output,
            &base_dir,
            args.website_filter,
        )?
    };

    println!("\n{}", stats);
    if stats.unique_rows_written == 0 {
        anyhow::bail!("Nothing was merged");
    }
    Ok(())
}

// ============================================================================
// Config
// ============================================================================

fn config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {:?} (use --force to overwrite)",
            path
        );
    }
    Config::default().save_to(path)?;
    info!("Wrote default config to {:?}", path);
    println!("✅ Wrote default config to {}", path.display());
    Ok(())
}
