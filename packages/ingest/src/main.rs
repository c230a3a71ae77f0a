#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the POI atlas loader.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indicatif::MultiProgress;
use poi_atlas_database::{db, schema};
use poi_atlas_ingest::progress::IndicatifProgress;
use poi_atlas_source::registry::{all_countries, enabled_countries};

#[derive(Parser)]
#[command(name = "poi_atlas_ingest", about = "OSM points-of-interest loader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, filter, and load every configured country
    LoadAll {
        /// Comma-separated list of country IDs to load (default: all)
        #[arg(long)]
        countries: Option<String>,
        /// Directory for extracts and temporary conversion output
        #[arg(long, default_value = "data/work")]
        work_dir: PathBuf,
    },
    /// Download, filter, and load a single country
    Load {
        /// Country identifier (e.g., "chile")
        country: String,
        /// Directory for extracts and temporary conversion output
        #[arg(long, default_value = "data/work")]
        work_dir: PathBuf,
    },
    /// List all configured countries
    Countries,
    /// Create the pois table and spatial index if absent
    Provision,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Countries => {
            let countries = all_countries();
            println!("{:<12} NAME", "ID");
            println!("{}", "-".repeat(40));
            for country in &countries {
                println!("{:<12} {}", country.id, country.name);
            }
        }
        Commands::Provision => {
            let db = db::connect_from_env().await?;
            schema::ensure_schema(db.as_ref()).await?;
            log::info!("Provisioning complete.");
        }
        Commands::Load { country, work_dir } => {
            let countries = all_countries();
            let selected = countries
                .iter()
                .find(|c| c.id == country)
                .cloned()
                .ok_or_else(|| format!("Unknown country: {country}"))?;

            run_pipeline(&[selected], &work_dir).await?;
        }
        Commands::LoadAll {
            countries,
            work_dir,
        } => {
            let selected = enabled_countries(countries.as_deref());
            if selected.is_empty() {
                log::warn!("No countries selected; nothing to do.");
                return Ok(());
            }

            log::info!(
                "Loading {} country(ies): {}",
                selected.len(),
                selected
                    .iter()
                    .map(|c| c.id.clone())
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            run_pipeline(&selected, &work_dir).await?;
        }
    }

    Ok(())
}

/// Connects, provisions, and runs the orchestrator with a download bar.
async fn run_pipeline(
    countries: &[poi_atlas_models::CountryConfig],
    work_dir: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_from_env().await?;

    let multi = MultiProgress::new();
    let bar = IndicatifProgress::download_bar(&multi, "Starting...");

    let summary = poi_atlas_ingest::run(db.as_ref(), countries, work_dir, Some(bar.clone())).await;

    bar.finish_and_clear();

    let summary = summary?;
    log::info!(
        "{} record(s) loaded; {} partition(s) abandoned; {} country(ies) skipped",
        summary.records_loaded(),
        summary.partitions_abandoned(),
        summary.countries_skipped()
    );

    Ok(())
}
