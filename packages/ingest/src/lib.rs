#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion pipeline for Seattle crime incident exports.
//!
//! Raw rows flow through two pure stages: [`parse`] resolves dates and
//! times into a partially-typed record, and [`normalize`] cleans,
//! classifies, and validates it into a canonical incident. One
//! [`Ingestor`] run materializes the full [`CanonicalTable`] and reports
//! an [`IngestSummary`]; bad rows are counted, never fatal.

pub mod normalize;
pub mod parse;
pub mod reader;
pub mod taxonomy;

use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use crime_dash_incident_models::{CanonicalTable, RawRecord};
use crime_dash_ingest_models::IngestSummary;

use crate::taxonomy::CrimeAgainstTaxonomy;

/// Errors that abort an ingestion run.
///
/// Anything wrong with a single row is a
/// [`RejectReason`](crime_dash_ingest_models::RejectReason) counted in the
/// run summary instead.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Source file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source CSV was structurally invalid.
    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    /// Classification rules were not valid TOML.
    #[error("Taxonomy parse error: {0}")]
    TaxonomyParse(#[from] toml::de::Error),

    /// Classification rules were well-formed TOML but semantically invalid.
    #[error("Invalid taxonomy: {message}")]
    InvalidTaxonomy {
        /// Description of what is wrong with the rule set.
        message: String,
    },

    /// The source header row lacks columns the pipeline cannot run without.
    #[error("Source is missing required columns: {missing}")]
    MissingColumns {
        /// Description of the missing columns.
        missing: String,
    },
}

/// The parse + normalize pipeline for one ingestion run.
///
/// Holds the classification rule set and the processing date used as the
/// upper bound for date validation. Rebuilding the table means running a
/// fresh ingestion over the full raw input; there is no incremental path.
pub struct Ingestor {
    taxonomy: CrimeAgainstTaxonomy,
    today: NaiveDate,
}

impl Ingestor {
    /// Creates a pipeline using the embedded classification rules.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the embedded rule set fails to parse.
    pub fn new(today: NaiveDate) -> Result<Self, IngestError> {
        Ok(Self {
            taxonomy: CrimeAgainstTaxonomy::load_default()?,
            today,
        })
    }

    /// Creates a pipeline with a caller-supplied rule set.
    #[must_use]
    pub const fn with_taxonomy(taxonomy: CrimeAgainstTaxonomy, today: NaiveDate) -> Self {
        Self { taxonomy, today }
    }

    /// Runs the pipeline over raw rows, producing the materialized table
    /// and the run summary.
    ///
    /// Row-level failures never abort the run; each is counted in the
    /// summary under its rejection reason.
    #[must_use]
    pub fn ingest<I>(&self, rows: I) -> (CanonicalTable, IngestSummary)
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let started = Instant::now();
        let mut summary = IngestSummary::default();
        let mut incidents = Vec::new();

        for raw in rows {
            summary.raw_rows += 1;

            let parsed = match parse::parse_record(raw) {
                Ok(parsed) => parsed,
                Err(reason) => {
                    log::debug!("row {} rejected: {reason}", summary.raw_rows);
                    summary.record_rejection(reason);
                    continue;
                }
            };

            match normalize::normalize(parsed, &self.taxonomy, self.today) {
                Ok(incident) => {
                    summary.accepted += 1;
                    incidents.push(incident);
                }
                Err(reason) => {
                    log::debug!("row {} rejected: {reason}", summary.raw_rows);
                    summary.record_rejection(reason);
                }
            }
        }

        summary.duration = started.elapsed();
        log::info!(
            "Ingested {} of {} raw rows ({} rejected) in {:?}",
            summary.accepted,
            summary.raw_rows,
            summary.rejected_total(),
            summary.duration
        );

        (CanonicalTable::new(incidents), summary)
    }

    /// Reads a CSV export and runs the full pipeline over it.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the file cannot be read or its header
    /// row lacks required columns.
    pub fn ingest_csv_path(
        &self,
        path: &Path,
    ) -> Result<(CanonicalTable, IngestSummary), IngestError> {
        let rows = reader::read_csv_path(path)?;
        Ok(self.ingest(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crime_dash_incident_models::CrimeAgainst;
    use crime_dash_ingest_models::RejectReason;

    fn fixture_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn raw(date: &str, hour: i64, offense: &str) -> RawRecord {
        RawRecord {
            offense_date: Some(date.to_string()),
            hour: Some(hour),
            offense: Some(offense.to_string()),
            ..RawRecord::default()
        }
    }

    #[test]
    fn mixed_rows_are_counted_per_reason() {
        let ingestor = Ingestor::new(fixture_today()).unwrap();

        let rows = vec![
            RawRecord {
                latitude: Some(47.61),
                longitude: Some(-122.33),
                ..raw("2019-05-01", 14, "BURGLARY")
            },
            // no date-bearing field at all
            RawRecord {
                offense: Some("THEFT".to_string()),
                hour: Some(3),
                ..RawRecord::default()
            },
            RawRecord {
                ..raw("five days ago", 3, "THEFT")
            },
            RawRecord {
                offense: Some("   ".to_string()),
                ..raw("2019-05-01", 3, "placeholder")
            },
            RawRecord {
                ..raw("2007-12-31", 3, "THEFT")
            },
            RawRecord {
                latitude: Some(f64::NAN),
                longitude: Some(-122.33),
                ..raw("2019-05-01", 3, "THEFT")
            },
        ];

        let (table, summary) = ingestor.ingest(rows);

        assert_eq!(summary.raw_rows, 6);
        assert_eq!(summary.accepted, 1);
        assert_eq!(
            summary.rejected_for(RejectReason::MissingRequiredField),
            1
        );
        assert_eq!(summary.rejected_for(RejectReason::UnparsableDate), 1);
        assert_eq!(summary.rejected_for(RejectReason::EmptyOffense), 1);
        assert_eq!(summary.rejected_for(RejectReason::DateOutOfRange), 1);
        assert_eq!(summary.rejected_for(RejectReason::InvalidCoordinates), 1);
        assert_eq!(summary.rejected_total(), 5);
        assert_eq!(summary.raw_rows, summary.accepted + summary.rejected_total());

        assert_eq!(table.len(), 1);
        let incident = &table.incidents()[0];
        assert_eq!(incident.offense, "BURGLARY");
        assert_eq!(incident.crime_against_category, CrimeAgainst::Property);
        assert!(incident.location.is_some());
    }

    #[test]
    fn reingesting_the_same_input_is_identical() {
        let ingestor = Ingestor::new(fixture_today()).unwrap();
        let rows = vec![
            raw("2019-05-01", 14, "BURGLARY"),
            raw("2018-02-10", 9, "ASSAULT"),
            raw("2020-08-30", 22, "NARCOTIC POSSESSION"),
        ];

        let (first, _) = ingestor.ingest(rows.clone());
        let (second, _) = ingestor.ingest(rows);

        assert_eq!(first, second);
    }

    #[test]
    fn csv_export_flows_end_to_end() {
        let csv_text = "\
Offense Date,Offense Category,MCPP Neighborhood,Latitude,Longitude
2019-05-01 14:30:00,CAR PROWL,BALLARD,47.67,-122.38
2019-06-02 09:00:00,ASSAULT,CAPITOL HILL,REDACTED,REDACTED
";
        let rows = reader::read_csv(csv_text.as_bytes()).unwrap();
        let (table, summary) = Ingestor::new(fixture_today()).unwrap().ingest(rows);

        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.rejected_total(), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.incidents()[0].hour, 14);
        assert_eq!(
            table.incidents()[0].crime_against_category,
            CrimeAgainst::Property
        );
        assert!(table.incidents()[1].location.is_none());
    }
}
