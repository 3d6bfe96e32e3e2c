#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for `EnforceIQ`.
//!
//! Lists and runs the canned catalog queries, prints the headline metrics,
//! predicts a stop outcome from a partial observation, and starts the API
//! server. Run without a subcommand for an interactive menu.
//!
//! ```text
//! enforceiq_cli queries --tier advanced
//! enforceiq_cli run standard "2. Most frequently searched vechicles"
//! enforceiq_cli predict --gender M --age 30 --search-conducted --duration "0-15 Min"
//! ```

mod interactive;
mod output;
mod session;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use enforceiq_analytics::dataset::StopDataset;
use enforceiq_analytics::predictor::DEFAULT_PREVIEW_LEN;
use enforceiq_analytics::summary::describe_prediction;
use enforceiq_analytics_models::PredictionQuery;
use enforceiq_catalog::QueryCatalog;
use enforceiq_catalog_models::QueryTier;
use serde::Serialize;

use crate::session::Session;

#[derive(Parser)]
#[command(name = "enforceiq", about = "Traffic stop analytics")]
struct Cli {
    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog query labels
    Queries {
        /// Only list this tier (`standard`/`medium` or `advanced`/`complex`)
        #[arg(long, value_parser = parse_tier)]
        tier: Option<QueryTier>,
    },
    /// Print a catalog query's SQL without running it
    Show {
        #[arg(value_parser = parse_tier)]
        tier: QueryTier,
        label: String,
    },
    /// Run a catalog query
    Run {
        #[arg(value_parser = parse_tier)]
        tier: QueryTier,
        label: String,
    },
    /// Print headline metrics for the loaded stop log
    Metrics,
    /// Predict the outcome and violation of a stop
    Predict(PredictArgs),
    /// Start the API server
    Serve,
}

#[derive(Args)]
struct PredictArgs {
    /// Driver gender (`M` or `F`)
    #[arg(long)]
    gender: String,
    /// Driver age in years
    #[arg(long)]
    age: u32,
    #[arg(long)]
    search_conducted: bool,
    #[arg(long)]
    drugs_related: bool,
    /// Duration bucket, e.g. `0-15 Min`
    #[arg(long)]
    duration: String,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    race: Option<String>,
    #[arg(long)]
    search_type: Option<String>,
    #[arg(long)]
    vehicle: Option<String>,
    /// `YYYY-MM-DD`
    #[arg(long)]
    date: Option<NaiveDate>,
    /// `HH:MM` or `HH:MM:SS`
    #[arg(long, value_parser = parse_time)]
    time: Option<NaiveTime>,
}

impl From<PredictArgs> for PredictionQuery {
    fn from(args: PredictArgs) -> Self {
        Self {
            driver_gender: args.gender,
            driver_age: args.age,
            search_conducted: args.search_conducted,
            drugs_related_stop: args.drugs_related,
            stop_duration: args.duration,
            stop_date: args.date,
            stop_time: args.time,
            country_name: args.country,
            driver_race: args.race,
            search_type: args.search_type,
            vehicle_number: args.vehicle,
        }
    }
}

fn parse_tier(raw: &str) -> Result<QueryTier, String> {
    raw.parse()
        .map_err(|_| format!("unknown tier '{raw}', expected 'standard' or 'advanced'"))
}

fn parse_time(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
}

fn print_json(value: &impl Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Starts the API server on its own actix system.
///
/// The server uses actix-web's runtime, so it runs in a blocking task to
/// avoid nesting tokio runtimes.
async fn serve(interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if interactive {
                enforceiq_server::interactive::run().await
            } else {
                enforceiq_server::run_server().await
            }
        })
    })
    .await??;
    Ok(())
}

fn predict(
    dataset: &StopDataset,
    query: &PredictionQuery,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let cohort = dataset.cohort(query);
    let prediction = cohort.prediction();

    if json {
        print_json(&prediction)?;
        return Ok(());
    }

    print!("{}", describe_prediction(query, &prediction));
    println!();

    if prediction.is_fallback() {
        println!("No matching stops found; showing the default guess.");
        return Ok(());
    }

    let preview = cohort.preview(DEFAULT_PREVIEW_LEN);
    println!("Matched {} stops. First {}:", cohort.len(), preview.len());
    print!(
        "{}",
        output::render_records(dataset.table().columns(), preview)
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run().await;
    };

    match command {
        Commands::Queries { tier } => {
            let catalog = QueryCatalog::from_env()?;
            let tiers = tier.map_or_else(|| QueryTier::all().to_vec(), |t| vec![t]);
            if cli.json {
                let labels: serde_json::Map<String, serde_json::Value> = tiers
                    .iter()
                    .map(|t| (t.to_string(), serde_json::json!(catalog.labels(*t))))
                    .collect();
                print_json(&labels)?;
            } else {
                for t in tiers {
                    println!("{}", output::render_labels(t, &catalog.labels(t)));
                }
            }
        }
        Commands::Show { tier, label } => {
            let catalog = QueryCatalog::from_env()?;
            let definition = catalog.get(tier, &label)?;
            if cli.json {
                print_json(definition)?;
            } else {
                println!("{}", definition.sql());
            }
        }
        Commands::Run { tier, label } => {
            let session = Session::from_env().await?;
            let report = session.run_query(tier, &label).await?;
            if cli.json {
                print_json(&report.result)?;
            } else {
                print!("{}", output::render_report(&report));
            }
        }
        Commands::Metrics => {
            let session = Session::from_env().await?;
            let metrics = session.dataset().await.key_metrics();
            if cli.json {
                print_json(&metrics)?;
            } else {
                print!("{}", output::render_metrics(&metrics));
            }
        }
        Commands::Predict(args) => {
            let session = Session::from_env().await?;
            let dataset = session.dataset().await;
            predict(&dataset, &args.into(), cli.json)?;
        }
        Commands::Serve => serve(false).await?,
    }

    Ok(())
}
