//! Chizu CLI - Command-line interface
//!
//! Usage:
//!   chizu init-db
//!   chizu extract
//!   chizu geocode
//!   chizu run
//!   chizu report
//!
//! Author: hephaex@gmail.com

use clap::{Parser, Subcommand};

use chizu_core::AppConfig;
use chizu_extractor::{CatalogExtractor, ContextAdjuster};
use chizu_geocoding::{create_geocoder, MinInterval};
use chizu_pipeline::{ExtractionPass, GeocodingPass, Report};
use chizu_store::{schema, SqliteStore};

#[derive(Parser)]
#[command(name = "chizu")]
#[command(about = "Toponym extraction and geocoding for literary corpora")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    InitDb,
    /// Extract toponyms from all sentences and link mentions
    Extract,
    /// Geocode places still lacking coordinates
    Geocode,
    /// Run extraction, then geocoding, then print the report
    Run,
    /// Print the aggregate report
    Report {
        /// Number of entries in the most-mentioned places listing
        #[arg(long, default_value_t = 20)]
        top: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env().unwrap_or_default(),
    };

    init_tracing(&config);

    let store =
        SqliteStore::connect(&config.database.url, config.database.max_connections).await?;

    match cli.command {
        Commands::InitDb => {
            schema::provision(store.pool()).await?;
            println!("Database schema ready at {}", config.database.url);
        }
        Commands::Extract => {
            run_extraction(&store, &config).await?;
        }
        Commands::Geocode => {
            run_geocoding(&store, &config).await?;
        }
        Commands::Run => {
            schema::provision(store.pool()).await?;
            run_extraction(&store, &config).await?;
            run_geocoding(&store, &config).await?;
            print!("{}", Report::gather(&store, 20).await?.render());
        }
        Commands::Report { top } => {
            print!("{}", Report::gather(&store, top).await?.render());
        }
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json_format {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run_extraction(store: &SqliteStore, config: &AppConfig) -> anyhow::Result<()> {
    let mut extractor = CatalogExtractor::standard();
    if config.pipeline.context_adjustment {
        extractor = extractor.with_adjuster(ContextAdjuster::new());
    }

    let pass = ExtractionPass::new(store, Box::new(extractor), config.pipeline.clone());
    let summary = pass.run().await?;

    println!(
        "Extraction: {} sentences processed, {} skipped, {} matches, {} new places, {} new links",
        summary.processed,
        summary.skipped,
        summary.matches,
        summary.places_created,
        summary.links_created
    );
    if !summary.failures.is_empty() {
        println!("  {} sentences failed, see the log", summary.failures.len());
    }

    Ok(())
}

async fn run_geocoding(store: &SqliteStore, config: &AppConfig) -> anyhow::Result<()> {
    let geocoder = create_geocoder(&config.geocoder)?;

    let pass = GeocodingPass::new(store, geocoder)
        .with_throttle(MinInterval::from_millis(config.pipeline.request_interval_ms))
        .with_progress_interval(config.pipeline.progress_interval);
    let summary = pass.run().await?;

    println!(
        "Geocoding: {} attempted, {} geocoded, {} left for a future run",
        summary.attempted, summary.geocoded, summary.failed
    );

    Ok(())
}
