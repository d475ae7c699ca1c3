#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Canonical crime incident schema and the crime-against taxonomy.
//!
//! Ingestion normalizes every raw source row into a [`CanonicalIncident`]
//! and materializes the full run into a [`CanonicalTable`]. Downstream
//! consumers (aggregation, the detail-table view, external storage) only
//! ever see these types.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// NIBRS-style top-level grouping of who or what an offense is committed
/// against.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeAgainst {
    /// Crimes against persons (assault, homicide, sex offenses)
    Person,
    /// Crimes against property (theft, burglary, robbery, arson)
    Property,
    /// Crimes against society (narcotics, weapons, vice offenses)
    Society,
    /// Offense text that no classification rule matched
    Unknown,
}

impl CrimeAgainst {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Person, Self::Property, Self::Society, Self::Unknown]
    }

    /// Whether a classification rule actually matched this offense.
    #[must_use]
    pub const fn is_classified(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// A WGS84 coordinate pair.
///
/// Only ever stored as a pair; an incident either has a complete
/// [`GeoPoint`] or no geolocation at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// One raw source row, as read from a CSV export or query result set.
///
/// Every field is optional: source exports differ in which columns they
/// carry, and individual cells are frequently blank or redacted. The parser
/// decides which absences are fatal for the row. Keeping the fields named
/// and sealed (instead of passing a string map through the pipeline) means
/// a misspelled column can only fail in one place, the source adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    /// Primary occurrence date or combined datetime text.
    pub offense_date: Option<String>,
    /// Report datetime text, used when the offense date is absent.
    pub report_datetime: Option<String>,
    /// Time-of-day text (`HH:MM:SS` or `HH:MM`).
    pub offense_time: Option<String>,
    /// Explicit hour column carried by some export variants.
    pub hour: Option<i64>,
    /// Offense description.
    pub offense: Option<String>,
    /// Finer-grained offense description.
    pub offense_sub_category: Option<String>,
    /// Block-level address free text.
    pub block_address: Option<String>,
    /// Neighborhood name.
    pub neighborhood: Option<String>,
    /// Police precinct code.
    pub precinct: Option<String>,
    /// Police sector code.
    pub sector: Option<String>,
    /// Latitude; redacted or unparsable source text arrives as `None`.
    pub latitude: Option<f64>,
    /// Longitude; redacted or unparsable source text arrives as `None`.
    pub longitude: Option<f64>,
    /// Dataset-provided hazard weighting.
    pub hazard_score: Option<f64>,
}

/// A crime incident validated and normalized to the canonical schema.
///
/// Produced exclusively by the ingestion pipeline; every invariant listed
/// on the fields has already been enforced by the time a value of this
/// type exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalIncident {
    /// Occurrence date, within [2008-01-01, processing date].
    pub date: NaiveDate,
    /// Time of day, when the source carried one.
    pub time_of_day: Option<NaiveTime>,
    /// Hour of day, 0-23. Equals `time_of_day`'s hour whenever that field
    /// is present.
    pub hour: u8,
    /// Offense description: non-empty, trimmed, uppercased, internal
    /// whitespace collapsed.
    pub offense: String,
    /// Finer-grained offense description, trimmed.
    pub offense_sub_category: Option<String>,
    /// Crime-against grouping derived from the offense text.
    pub crime_against_category: CrimeAgainst,
    /// Block-level address free text, trimmed; may be empty.
    pub location_text: String,
    /// Neighborhood name, trimmed.
    pub area: Option<String>,
    /// Police precinct code, trimmed.
    pub precinct: Option<String>,
    /// Police sector code, trimmed.
    pub sector: Option<String>,
    /// Geolocation inside the city bounding box, or `None` when the source
    /// coordinates were missing, redacted, or out of bounds.
    #[serde(flatten)]
    pub location: Option<GeoPoint>,
    /// Hazard weighting, non-negative.
    pub hazard_score: Option<f64>,
}

impl CanonicalIncident {
    /// Latitude of the incident, when geolocated.
    #[must_use]
    pub const fn latitude(&self) -> Option<f64> {
        match self.location {
            Some(point) => Some(point.latitude),
            None => None,
        }
    }

    /// Longitude of the incident, when geolocated.
    #[must_use]
    pub const fn longitude(&self) -> Option<f64> {
        match self.location {
            Some(point) => Some(point.longitude),
            None => None,
        }
    }
}

/// The materialized output of one ingestion run.
///
/// Ordered by occurrence date (ascending), immutable once built, and
/// rebuilt wholesale on re-ingestion; there is no incremental update path.
/// Reads never mutate, so sharing a table across query callers is safe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTable {
    incidents: Vec<CanonicalIncident>,
}

impl CanonicalTable {
    /// Builds a table from the incidents of one ingestion run.
    ///
    /// Sorts by date, then hour; the sort is stable, so records that tie
    /// keep their ingestion order and identical input always produces an
    /// identical table.
    #[must_use]
    pub fn new(mut incidents: Vec<CanonicalIncident>) -> Self {
        incidents.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.hour.cmp(&b.hour)));
        Self { incidents }
    }

    /// All incidents, ordered by date ascending.
    #[must_use]
    pub fn incidents(&self) -> &[CanonicalIncident] {
        &self.incidents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Earliest and latest occurrence dates, or `None` for an empty table.
    ///
    /// The UI layer seeds its date-range picker from this.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.incidents.first(), self.incidents.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// Distinct neighborhood names, sorted.
    #[must_use]
    pub fn areas(&self) -> BTreeSet<&str> {
        self.incidents
            .iter()
            .filter_map(|incident| incident.area.as_deref())
            .collect()
    }

    /// Distinct precinct codes, sorted.
    #[must_use]
    pub fn precincts(&self) -> BTreeSet<&str> {
        self.incidents
            .iter()
            .filter_map(|incident| incident.precinct.as_deref())
            .collect()
    }

    /// Distinct sector codes, sorted.
    #[must_use]
    pub fn sectors(&self) -> BTreeSet<&str> {
        self.incidents
            .iter()
            .filter_map(|incident| incident.sector.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(date: &str, hour: u8, offense: &str, area: Option<&str>) -> CanonicalIncident {
        CanonicalIncident {
            date: date.parse().unwrap(),
            time_of_day: None,
            hour,
            offense: offense.to_string(),
            offense_sub_category: None,
            crime_against_category: CrimeAgainst::Unknown,
            location_text: String::new(),
            area: area.map(ToString::to_string),
            precinct: None,
            sector: None,
            location: None,
            hazard_score: None,
        }
    }

    #[test]
    fn crime_against_uses_dataset_vocabulary() {
        assert_eq!(CrimeAgainst::Person.to_string(), "PERSON");
        assert_eq!(CrimeAgainst::Society.to_string(), "SOCIETY");
        assert_eq!("PROPERTY".parse::<CrimeAgainst>(), Ok(CrimeAgainst::Property));
        assert!("VIOLENT".parse::<CrimeAgainst>().is_err());
    }

    #[test]
    fn all_lists_every_grouping_once() {
        let all = CrimeAgainst::all();
        assert_eq!(all.len(), 4);
        for variant in all {
            assert_eq!(all.iter().filter(|v| *v == variant).count(), 1);
        }
    }

    #[test]
    fn table_orders_by_date_then_hour() {
        let table = CanonicalTable::new(vec![
            incident("2021-03-09", 12, "THEFT", None),
            incident("2019-01-02", 23, "ASSAULT", None),
            incident("2019-01-02", 7, "BURGLARY", None),
        ]);
        let dates: Vec<(NaiveDate, u8)> = table
            .incidents()
            .iter()
            .map(|i| (i.date, i.hour))
            .collect();
        assert_eq!(
            dates,
            vec![
                ("2019-01-02".parse().unwrap(), 7),
                ("2019-01-02".parse().unwrap(), 23),
                ("2021-03-09".parse().unwrap(), 12),
            ]
        );
    }

    #[test]
    fn rebuild_from_same_input_is_identical() {
        let rows = vec![
            incident("2020-06-15", 1, "THEFT", Some("QUEEN ANNE")),
            incident("2018-11-30", 22, "ROBBERY", Some("CAPITOL HILL")),
            incident("2018-11-30", 22, "THEFT", Some("BALLARD")),
        ];
        assert_eq!(CanonicalTable::new(rows.clone()), CanonicalTable::new(rows));
    }

    #[test]
    fn date_range_spans_first_to_last() {
        assert_eq!(CanonicalTable::new(vec![]).date_range(), None);

        let table = CanonicalTable::new(vec![
            incident("2020-06-15", 1, "THEFT", None),
            incident("2009-02-01", 5, "THEFT", None),
            incident("2015-08-20", 9, "THEFT", None),
        ]);
        assert_eq!(
            table.date_range(),
            Some(("2009-02-01".parse().unwrap(), "2020-06-15".parse().unwrap()))
        );
    }

    #[test]
    fn distinct_value_accessors_dedupe_and_sort() {
        let table = CanonicalTable::new(vec![
            incident("2020-01-01", 0, "THEFT", Some("NORTHGATE")),
            incident("2020-01-02", 0, "THEFT", Some("BALLARD")),
            incident("2020-01-03", 0, "THEFT", Some("NORTHGATE")),
            incident("2020-01-04", 0, "THEFT", None),
        ]);
        let areas: Vec<&str> = table.areas().into_iter().collect();
        assert_eq!(areas, vec!["BALLARD", "NORTHGATE"]);
        assert!(table.precincts().is_empty());
    }

    #[test]
    fn coordinate_accessors_follow_location() {
        let mut row = incident("2020-01-01", 0, "THEFT", None);
        assert_eq!((row.latitude(), row.longitude()), (None, None));

        row.location = Some(GeoPoint::new(47.61, -122.33));
        assert_eq!(row.latitude(), Some(47.61));
        assert_eq!(row.longitude(), Some(-122.33));
    }
}
