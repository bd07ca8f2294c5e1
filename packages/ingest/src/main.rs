#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the admissions data tool.

use std::path::PathBuf;
use std::time::Instant;

use admit_stats_analytics::reports;
use admit_stats_analytics_models::{
    CampusSelect, SchoolRatesParams, SchoolTypeSelect, YearSelect,
};
use admit_stats_database::{db, schema};
use admit_stats_ingest::{import_count_facts, import_populations};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "admit_stats_ingest", about = "Admissions data ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the fact store schema if it does not exist
    Init,
    /// Import admission count facts from a CSV export
    ImportCounts {
        /// Path to the CSV file
        file: PathBuf,
        /// Year to assume for rows without a year column (e.g. "2023")
        #[arg(long)]
        year: Option<String>,
        /// Campus code to assume for rows without a campus column (e.g. "ucb")
        #[arg(long)]
        campus: Option<String>,
    },
    /// Import high-school population figures from a CSV export
    ImportPopulations {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// List the schools known to the fact store
    Schools,
    /// Print an analysis report as JSON
    Analyze {
        /// Report to run: "campus" or "school"
        #[arg(long, default_value = "campus")]
        by: String,
        /// "all", "individual", or a campus code like "ucb"
        #[arg(long, default_value = "all")]
        select_campus: String,
        /// "all" or a specific year like "2023"
        #[arg(long, default_value = "all")]
        select_year: String,
        /// "all" or a school category like "public"
        #[arg(long, default_value = "all")]
        select_school_type: String,
        /// Page number (1-based); only applies together with --page-size
        #[arg(long)]
        page: Option<usize>,
        /// Number of schools per page
        #[arg(long)]
        page_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let (db, dialect) = db::connect_from_env().await?;
    schema::ensure_schema(db.as_ref(), dialect).await?;

    match cli.command {
        Commands::Init => {
            log::info!("Fact store schema is ready.");
        }
        Commands::ImportCounts { file, year, campus } => {
            let start = Instant::now();
            let outcome =
                import_count_facts(db.as_ref(), &file, year.as_deref(), campus.as_deref()).await?;
            log::info!(
                "Imported {} in {:.1}s",
                file.display(),
                start.elapsed().as_secs_f64()
            );
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::ImportPopulations { file } => {
            let start = Instant::now();
            let outcome = import_populations(db.as_ref(), &file).await?;
            log::info!(
                "Imported {} in {:.1}s",
                file.display(),
                start.elapsed().as_secs_f64()
            );
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Schools => {
            let schools = admit_stats_database::queries::list_schools(db.as_ref()).await?;
            println!("{:<40} {:<20} CATEGORY", "NAME", "CITY");
            println!("{}", "-".repeat(70));
            for school in &schools {
                println!(
                    "{:<40} {:<20} {}",
                    school.name,
                    school.city.as_deref().unwrap_or("-"),
                    school.category
                );
            }
        }
        Commands::Analyze {
            by,
            select_campus,
            select_year,
            select_school_type,
            page,
            page_size,
        } => match by.as_str() {
            "campus" => {
                let report = reports::campus_rates(db.as_ref()).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            "school" => {
                let params = school_params(
                    &select_campus,
                    &select_year,
                    &select_school_type,
                    page,
                    page_size,
                );
                let report = reports::school_rates(db.as_ref(), &params).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            other => {
                return Err(
                    format!("Unknown report {other:?}: expected \"campus\" or \"school\"").into(),
                );
            }
        },
    }

    Ok(())
}

/// Maps the analyze flags onto engine parameters. Pagination only applies
/// when a page size is given; the page number clamps to 1 and an oversized
/// one saturates past the end of the list.
fn school_params(
    select_campus: &str,
    select_year: &str,
    select_school_type: &str,
    page: Option<usize>,
    page_size: Option<usize>,
) -> SchoolRatesParams {
    let (offset, limit) = page_size.map_or((0, None), |size| {
        let page = page.unwrap_or(1).max(1);
        ((page - 1).saturating_mul(size), Some(size))
    });

    SchoolRatesParams {
        select_campus: CampusSelect::from_param(select_campus),
        select_year: YearSelect::from_param(select_year),
        select_school_type: SchoolTypeSelect::from_param(select_school_type),
        offset,
        limit,
    }
}
