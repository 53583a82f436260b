//! CLI entry point for the LionLease listing pipeline.
//!
//! Each subcommand is one batch stage reading and writing JSON listing
//! files: scrape, combine, assign-ids, score, geocode and enrich.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lion_listings::combine::{SourcePaths, combine_files, local_stamp};
use lion_listings::config::{GeocoderConfig, PipelineConfig};
use lion_listings::fetch::BasicClient;
use lion_listings::fetch::auth::ApiKey;
use lion_listings::geocode::{backfill_coordinates, enrich_neighborhoods};
use lion_listings::ids::assign_ids;
use lion_listings::infra::apify::{self, ApifyClient};
use lion_listings::infra::nominatim::NominatimClient;
use lion_listings::output::{
    append_records, print_json, read_listings, write_json, write_listings,
};
use lion_listings::scoring::features::FeatureSet;
use lion_listings::scoring::{ScoreConfig, score_listings};
use serde_json::json;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const SCRAPE_USER_AGENT: &str = concat!("lion_listings/", env!("CARGO_PKG_VERSION"));
/// Longer than the server-side long-poll window.
const SCRAPE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Parser)]
#[command(name = "lion_listings")]
#[command(about = "Normalize, deduplicate, score and geocode rental listings", long_about = None)]
struct Cli {
    /// Optional JSON file overriding neighborhoods, size defaults and geocoder settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the StreetEasy scraper actor and save its dataset
    Scrape {
        /// Neighborhood to search (repeatable)
        #[arg(long = "location", default_value = "Morningside Heights")]
        locations: Vec<String>,

        #[arg(long, default_value = "rent")]
        search_type: String,

        /// Maximum number of listings the actor should return
        #[arg(long, default_value_t = 1000)]
        limit: u32,

        #[arg(long, default_value = apify::STREETEASY_ACTOR)]
        actor: String,

        #[arg(short, long, default_value = "streeteasy_listings.json")]
        output: PathBuf,

        #[arg(long, env = "APIFY_TOKEN", hide_env_values = true)]
        token: String,

        #[arg(long, env = "APIFY_URL", default_value = apify::DEFAULT_BASE_URL)]
        apify_url: String,
    },
    /// Merge the three marketplace dumps into one deduplicated file
    Combine {
        #[arg(long, default_value = "compass_listings_full.json")]
        compass: PathBuf,

        #[arg(long, default_value = "renthop_listings_full.json")]
        renthop: PathBuf,

        #[arg(long, default_value = "streeteasy_listings.json")]
        streeteasy: PathBuf,

        #[arg(short, long, default_value = "combined_listings.json")]
        output: PathBuf,

        /// CSV file to append run statistics to
        #[arg(long)]
        stats: Option<PathBuf>,
    },
    /// Number listings by position (in place unless --output is given)
    AssignIds {
        #[arg(short, long, default_value = "combined_listings_with_lionscore.json")]
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Label listings with a cross-validated LionScore
    Score {
        #[arg(short, long, default_value = "enriched_listings_with_complaints.json")]
        input: PathBuf,

        #[arg(short, long, default_value = "listings_with_lionscore.json")]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = FeatureSet::Extended)]
        features: FeatureSet,

        /// CSV file to append the per-fold predictions to
        #[arg(long)]
        predictions: Option<PathBuf>,

        #[arg(long, default_value_t = 10)]
        folds: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Look up coordinates for listings that have none
    Geocode {
        #[arg(short, long, default_value = "combined_listings_with_lionscore.json")]
        input: PathBuf,

        #[arg(short, long, default_value = "combined_listings_with_lionscore.json")]
        output: PathBuf,

        /// Stop after this many lookups
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, env = "NOMINATIM_URL")]
        nominatim_url: Option<String>,

        #[arg(long, env = "NOMINATIM_USER_AGENT")]
        user_agent: Option<String>,
    },
    /// Fill in neighborhood names by reverse geocoding
    Enrich {
        #[arg(short, long, default_value = "combined_listings_with_lionscore.json")]
        input: PathBuf,

        #[arg(short, long, default_value = "combined_listings_enriched.json")]
        output: PathBuf,

        #[arg(long, env = "NOMINATIM_URL")]
        nominatim_url: Option<String>,

        #[arg(long, env = "NOMINATIM_USER_AGENT")]
        user_agent: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/lion_listings.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("lion_listings.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Scrape {
            locations,
            search_type,
            limit,
            actor,
            output,
            token,
            apify_url,
        } => {
            let http = BasicClient::new(SCRAPE_USER_AGENT, SCRAPE_TIMEOUT)?;
            let client = ApifyClient::new(ApiKey::bearer(http, &token)?, &apify_url)?;

            let input = json!({
                "location": locations,
                "search_type": search_type,
                "limit": limit,
            });
            let (_run, items) = client.call(&actor, &input).await?;
            write_json(&output, &items)?;
            info!(path = %output.display(), items = items.len(), "Scraped listings saved");
        }
        Commands::Combine {
            compass,
            renthop,
            streeteasy,
            output,
            stats,
        } => {
            let paths = SourcePaths {
                compass: &compass,
                renthop: &renthop,
                streeteasy: &streeteasy,
            };
            let (listings, run_stats) = combine_files(&paths, &local_stamp())?;
            write_listings(&output, &listings)?;

            info!(
                total = run_stats.total_records(),
                rejected_pct = run_stats.rejected_pct(),
                "Combine summary"
            );
            print_json(&run_stats)?;
            if let Some(stats) = stats {
                append_records(&stats, &[run_stats])?;
            }
        }
        Commands::AssignIds { input, output } => {
            let mut listings = read_listings(&input)?;
            let labeled = assign_ids(&mut listings);
            let output = output.unwrap_or(input);
            write_listings(&output, &listings)?;
            info!(labeled, path = %output.display(), "Ids assigned");
        }
        Commands::Score {
            input,
            output,
            features,
            predictions,
            folds,
            seed,
        } => {
            let mut listings = read_listings(&input)?;
            let score_config = ScoreConfig {
                features,
                folds,
                seed,
                sizes: config.size_defaults(),
            };
            let outcome = score_listings(&mut listings, &score_config)
                .with_context(|| format!("scoring {}", input.display()))?;
            write_listings(&output, &listings)?;

            print_json(&outcome.stats)?;
            if let Some(predictions) = predictions {
                append_records(&predictions, &outcome.predictions)?;
                info!(path = %predictions.display(), rows = outcome.predictions.len(), "Predictions saved");
            }
        }
        Commands::Geocode {
            input,
            output,
            limit,
            nominatim_url,
            user_agent,
        } => {
            let geocoder = nominatim(&config.geocoder, nominatim_url, user_agent)?;
            let mut listings = read_listings(&input)?;
            let report = backfill_coordinates(&mut listings, &geocoder, limit).await;
            write_listings(&output, &listings)?;
            print_json(&report)?;
        }
        Commands::Enrich {
            input,
            output,
            nominatim_url,
            user_agent,
        } => {
            let geocoder = nominatim(&config.geocoder, nominatim_url, user_agent)?;
            let mut listings = read_listings(&input)?;
            let report = enrich_neighborhoods(&mut listings, &geocoder, &config.matcher()).await;
            write_listings(&output, &listings)?;
            print_json(&report)?;
        }
    }

    Ok(())
}

/// Builds a rate-limited Nominatim client, letting flags and env override
/// the configured endpoint and user agent.
fn nominatim(
    config: &GeocoderConfig,
    base_url: Option<String>,
    user_agent: Option<String>,
) -> Result<NominatimClient<BasicClient>> {
    let user_agent = user_agent.unwrap_or_else(|| config.user_agent.clone());
    let base_url = base_url.unwrap_or_else(|| config.base_url.clone());

    let http = BasicClient::new(&user_agent, config.timeout())?;
    info!(%base_url, %user_agent, rps = config.requests_per_second.get(), "Geocoder ready");
    NominatimClient::new(http, &base_url, config.requests_per_second)
}
