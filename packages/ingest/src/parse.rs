//! Raw-row parsing: required-field checks and date/time resolution.
//!
//! Parsing is pure; the same [`RawRecord`] always yields the same outcome.
//! Field cleanup and validation happen later, in
//! [`normalize`](crate::normalize).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use crime_dash_incident_models::RawRecord;
use crime_dash_ingest_models::RejectReason;

/// Combined datetime formats observed across the known export variants,
/// tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%Y %b %d %I:%M:%S %p",
];

/// Date-only formats, tried after the combined formats.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A partially-typed record between parsing and normalization.
///
/// Date and hour are resolved; string fields are still raw. `hour` equals
/// `time_of_day`'s hour whenever that field is present.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub date: NaiveDate,
    pub time_of_day: Option<NaiveTime>,
    pub hour: u8,
    pub offense: String,
    pub offense_sub_category: Option<String>,
    pub location_text: Option<String>,
    pub area: Option<String>,
    pub precinct: Option<String>,
    pub sector: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hazard_score: Option<f64>,
}

/// Parses one raw row into a partially-typed record.
///
/// # Errors
///
/// * [`RejectReason::MissingRequiredField`] when the row has no offense
///   field or no date-bearing field at all.
/// * [`RejectReason::UnparsableDate`] when date text is present but no
///   known format matches.
/// * [`RejectReason::UnparsableTime`] when no time source (time string,
///   datetime component, or explicit hour field) yields a valid 0-23
///   hour.
pub fn parse_record(record: RawRecord) -> Result<ParsedRecord, RejectReason> {
    let (date, datetime_time) = resolve_date(&record)?;
    let (time_of_day, hour) = resolve_time(&record, datetime_time)?;

    let offense = record.offense.ok_or(RejectReason::MissingRequiredField)?;

    Ok(ParsedRecord {
        date,
        time_of_day,
        hour,
        offense,
        offense_sub_category: record.offense_sub_category,
        location_text: record.block_address,
        area: record.neighborhood,
        precinct: record.precinct,
        sector: record.sector,
        latitude: record.latitude,
        longitude: record.longitude,
        hazard_score: record.hazard_score,
    })
}

/// Resolves the occurrence date from the offense date field, falling back
/// to the report datetime. Also returns the time component when the text
/// carried one.
fn resolve_date(record: &RawRecord) -> Result<(NaiveDate, Option<NaiveTime>), RejectReason> {
    let candidates = [
        record.offense_date.as_deref(),
        record.report_datetime.as_deref(),
    ];

    let mut any_present = false;
    for candidate in candidates.into_iter().flatten() {
        let text = candidate.trim();
        if text.is_empty() {
            continue;
        }
        any_present = true;
        if let Some(parsed) = parse_date_text(text) {
            return Ok(parsed);
        }
    }

    if any_present {
        Err(RejectReason::UnparsableDate)
    } else {
        Err(RejectReason::MissingRequiredField)
    }
}

/// Tries every known format against one date or datetime string.
#[must_use]
pub fn parse_date_text(text: &str) -> Option<(NaiveDate, Option<NaiveTime>)> {
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some((datetime.date(), Some(datetime.time())));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some((date, None));
        }
    }
    None
}

/// Resolves time of day and hour, richest source first: the time string,
/// then the combined datetime's time component, then the explicit hour
/// field. An unparsable source falls through to the next one.
fn resolve_time(
    record: &RawRecord,
    datetime_time: Option<NaiveTime>,
) -> Result<(Option<NaiveTime>, u8), RejectReason> {
    if let Some(text) = record.offense_time.as_deref()
        && let Ok(time) = text.trim().parse::<NaiveTime>()
        && let Some(hour) = valid_hour(time.hour())
    {
        return Ok((Some(time), hour));
    }

    if let Some(time) = datetime_time
        && let Some(hour) = valid_hour(time.hour())
    {
        return Ok((Some(time), hour));
    }

    if let Some(raw_hour) = record.hour
        && let Ok(value) = u32::try_from(raw_hour)
        && let Some(hour) = valid_hour(value)
    {
        return Ok((None, hour));
    }

    Err(RejectReason::UnparsableTime)
}

fn valid_hour(value: u32) -> Option<u8> {
    u8::try_from(value).ok().filter(|hour| *hour <= 23)
}
