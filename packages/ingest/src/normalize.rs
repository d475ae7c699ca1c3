//! Field-level cleanup and validation of parsed records.
//!
//! Everything here is deterministic for a fixed processing date, so
//! re-running ingestion over the same raw input always rebuilds an
//! identical table.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use crime_dash_incident_models::{CanonicalIncident, GeoPoint};
use crime_dash_ingest_models::RejectReason;
use crime_dash_spatial::SEATTLE_BOUNDS;
use regex::Regex;

use crate::parse::ParsedRecord;
use crate::taxonomy::CrimeAgainstTaxonomy;

/// The source dataset's coverage starts at 2008-01-01; anything earlier is
/// a data entry error.
const MIN_INCIDENT_YEAR: i32 = 2008;

/// Regex to collapse runs of whitespace into a single space.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Cleans, classifies, and validates one parsed record.
///
/// `today` is the processing date; it caps the valid occurrence range.
///
/// Lenient policies, applied instead of rejecting:
/// * coordinates missing one half or outside the city bounding box are
///   cleared as a pair;
/// * negative hazard scores are clamped to zero, and non-finite ones are
///   dropped.
///
/// # Errors
///
/// * [`RejectReason::DateOutOfRange`] when the date falls before
///   2008-01-01 or after `today`.
/// * [`RejectReason::EmptyOffense`] when the offense text is empty after
///   trimming.
/// * [`RejectReason::InvalidCoordinates`] when a coordinate is present
///   but not a finite number.
pub fn normalize(
    record: ParsedRecord,
    taxonomy: &CrimeAgainstTaxonomy,
    today: NaiveDate,
) -> Result<CanonicalIncident, RejectReason> {
    if record.date.year() < MIN_INCIDENT_YEAR || record.date > today {
        return Err(RejectReason::DateOutOfRange);
    }

    let offense = clean_text(&record.offense).to_uppercase();
    if offense.is_empty() {
        return Err(RejectReason::EmptyOffense);
    }

    let location = validate_coordinates(record.latitude, record.longitude)?;
    let crime_against_category = taxonomy.classify(&offense);

    Ok(CanonicalIncident {
        date: record.date,
        time_of_day: record.time_of_day,
        hour: record.hour,
        offense,
        offense_sub_category: clean_optional(record.offense_sub_category),
        crime_against_category,
        location_text: record
            .location_text
            .map_or_else(String::new, |text| clean_text(&text)),
        area: clean_optional(record.area),
        precinct: clean_optional(record.precinct),
        sector: clean_optional(record.sector),
        location,
        hazard_score: record
            .hazard_score
            .filter(|score| score.is_finite())
            .map(|score| score.max(0.0)),
    })
}

/// Trims and collapses internal whitespace runs to single spaces.
#[must_use]
pub fn clean_text(input: &str) -> String {
    WHITESPACE_RE.replace_all(input, " ").trim().to_string()
}

/// Cleans an optional field, turning blank text into `None`.
fn clean_optional(input: Option<String>) -> Option<String> {
    input
        .map(|text| clean_text(&text))
        .filter(|text| !text.is_empty())
}

/// Applies the coordinate policy: a non-finite value rejects the row; a
/// half-present or out-of-bounds pair is cleared.
fn validate_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<GeoPoint>, RejectReason> {
    let finite = |value: Option<f64>| !matches!(value, Some(v) if !v.is_finite());
    if !finite(latitude) || !finite(longitude) {
        return Err(RejectReason::InvalidCoordinates);
    }

    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => {
            let point = GeoPoint::new(latitude, longitude);
            Ok(SEATTLE_BOUNDS.contains(point).then_some(point))
        }
        _ => Ok(None),
    }
}
