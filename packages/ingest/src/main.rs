#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the incident ingestion and analytics tool.
//!
//! Every run ingests the CSV export fresh and answers one query against
//! the resulting table. Results print as pretty JSON on stdout; progress
//! and the ingestion summary line go through the logger.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crime_dash_analytics::query;
use crime_dash_analytics_models::{
    FilterSpec, RadiusFilter, RankDirection, RankMetric, SortField, SortSpec,
};
use crime_dash_incident_models::{CrimeAgainst, GeoPoint};
use crime_dash_ingest::Ingestor;

#[derive(Parser)]
#[command(name = "crime_dash_ingest", about = "Seattle crime incident ingestion tool")]
struct Cli {
    /// Path to the incident CSV export
    #[arg(long)]
    input: PathBuf,

    /// Processing date override (YYYY-MM-DD); defaults to the current local date
    #[arg(long)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the export and report acceptance and rejection counts
    Summary,
    /// Aggregate matching incidents into counts and hazard totals
    Aggregate {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Rank areas by incident count or average hazard
    Rank {
        /// Ranking metric: count or average-hazard
        #[arg(long, default_value = "count")]
        metric: String,
        /// Rank smallest-first instead of largest-first
        #[arg(long)]
        lowest: bool,
        /// Number of areas to return
        #[arg(long, default_value = "10")]
        limit: usize,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List matching incidents for a detail view
    List {
        /// Maximum rows to return (default 500)
        #[arg(long)]
        limit: Option<usize>,
        /// Sort field: date, hour, offense, area, or hazard-score
        #[arg(long, default_value = "date")]
        sort: String,
        /// Sort ascending instead of descending
        #[arg(long)]
        ascending: bool,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

/// Filter options shared by every query subcommand.
#[derive(Args)]
struct FilterArgs {
    /// Start of the inclusive date range (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,
    /// End of the inclusive date range (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,
    /// Comma-separated crime-against groupings (person,property,society,unknown)
    #[arg(long)]
    categories: Option<String>,
    /// Start of the inclusive hour range (0-23)
    #[arg(long)]
    hour_start: Option<u8>,
    /// End of the inclusive hour range (0-23)
    #[arg(long)]
    hour_end: Option<u8>,
    /// Comma-separated area names, matched exactly
    #[arg(long)]
    areas: Option<String>,
    /// Latitude of the radius-filter center
    #[arg(long)]
    center_lat: Option<f64>,
    /// Longitude of the radius-filter center
    #[arg(long)]
    center_lng: Option<f64>,
    /// Radius in meters around the center
    #[arg(long)]
    radius: Option<f64>,
}

impl FilterArgs {
    fn to_spec(&self) -> Result<FilterSpec, String> {
        let date_range = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            (None, None) => None,
            _ => return Err("--start-date and --end-date must be given together".to_string()),
        };

        let hour_range = match (self.hour_start, self.hour_end) {
            (Some(from), Some(to)) => Some((from, to)),
            (None, None) => None,
            _ => return Err("--hour-start and --hour-end must be given together".to_string()),
        };

        let categories = self
            .categories
            .as_deref()
            .map(|text| {
                text.split(',')
                    .map(parse_enum::<CrimeAgainst>)
                    .collect::<Result<BTreeSet<_>, _>>()
            })
            .transpose()?;

        let areas = self.areas.as_deref().map(|text| {
            text.split(',')
                .map(str::trim)
                .filter(|area| !area.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
        });

        let radius = match (self.center_lat, self.center_lng, self.radius) {
            (Some(latitude), Some(longitude), Some(meters)) => Some(RadiusFilter {
                center: GeoPoint::new(latitude, longitude),
                meters,
            }),
            (None, None, None) => None,
            _ => {
                return Err(
                    "--center-lat, --center-lng, and --radius must be given together".to_string(),
                );
            }
        };

        Ok(FilterSpec {
            date_range,
            hour_range,
            categories,
            areas,
            radius,
        })
    }
}

/// Parses a reporting-vocabulary enum, accepting any case and hyphens.
fn parse_enum<T: std::str::FromStr>(text: &str) -> Result<T, String> {
    text.trim()
        .to_uppercase()
        .replace('-', "_")
        .parse::<T>()
        .map_err(|_| format!("unrecognized value '{}'", text.trim()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let today = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let ingestor = Ingestor::new(today)?;
    let (table, summary) = ingestor.ingest_csv_path(&cli.input)?;

    match cli.command {
        Commands::Summary => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Aggregate { filter } => {
            let result = query::aggregate(&table, &filter.to_spec()?)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Rank {
            metric,
            lowest,
            limit,
            filter,
        } => {
            let direction = if lowest {
                RankDirection::Lowest
            } else {
                RankDirection::Highest
            };
            let rankings = query::rank_areas(
                &table,
                &filter.to_spec()?,
                parse_enum::<RankMetric>(&metric)?,
                direction,
                limit,
            )?;
            println!("{}", serde_json::to_string_pretty(&rankings)?);
        }
        Commands::List {
            limit,
            sort,
            ascending,
            filter,
        } => {
            let sort = SortSpec {
                field: parse_enum::<SortField>(&sort)?,
                descending: !ascending,
            };
            let rows = query::list(&table, &filter.to_spec()?, limit, sort)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
