//! CSV source adapter.
//!
//! The city has published incident exports under several header vintages.
//! This adapter resolves known header aliases onto [`RawRecord`] fields
//! once per file, so a renamed or misspelled column can only fail here.

use std::io::Read;
use std::path::Path;

use crime_dash_incident_models::RawRecord;

use crate::IngestError;

/// Cell text the portal substitutes for withheld values.
const REDACTED: &str = "REDACTED";

const OFFENSE_DATE_COLUMNS: &[&str] = &["Offense Date", "Offense Start DateTime"];
const REPORT_DATETIME_COLUMNS: &[&str] = &["Report DateTime"];
const OFFENSE_TIME_COLUMNS: &[&str] = &["Offense Time"];
const HOUR_COLUMNS: &[&str] = &["Offense Hour", "Hour"];
const YEAR_COLUMNS: &[&str] = &["Offense Year"];
const MONTH_COLUMNS: &[&str] = &["Offense Month"];
const DAY_COLUMNS: &[&str] = &["Offense Day"];
const OFFENSE_COLUMNS: &[&str] = &[
    "Offense Category",
    "NIBRS Offense Code Description",
    "Offense",
];
const SUB_CATEGORY_COLUMNS: &[&str] = &["Offense Sub Category"];
const ADDRESS_COLUMNS: &[&str] = &["Block Address", "100 Block Address"];
const AREA_COLUMNS: &[&str] = &["MCPP Neighborhood", "Neighborhood", "MCPP"];
const PRECINCT_COLUMNS: &[&str] = &["Precinct"];
const SECTOR_COLUMNS: &[&str] = &["Sector"];
const LATITUDE_COLUMNS: &[&str] = &["Latitude"];
const LONGITUDE_COLUMNS: &[&str] = &["Longitude"];
const HAZARD_COLUMNS: &[&str] = &["Hazardness", "Hazard Score"];

/// Reads every row of a CSV export into raw records.
///
/// # Errors
///
/// * [`IngestError::Io`] if the file cannot be opened.
/// * [`IngestError::Csv`] if the file is not readable as CSV.
/// * [`IngestError::MissingColumns`] if the header row lacks an offense
///   column or any date-bearing column.
pub fn read_csv_path(path: &Path) -> Result<Vec<RawRecord>, IngestError> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Reads raw records from any CSV source.
///
/// Ragged rows surface as absent fields and get rejected row-by-row
/// downstream rather than aborting the run.
///
/// # Errors
///
/// * [`IngestError::Csv`] if the source is not readable as CSV.
/// * [`IngestError::MissingColumns`] if the header row lacks an offense
///   column or any date-bearing column.
pub fn read_csv<R: Read>(source: R) -> Result<Vec<RawRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let columns = ColumnMap::resolve(reader.headers()?)?;

    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(columns.raw_record(&row?));
    }
    Ok(rows)
}

/// Field-to-column-index mapping resolved from one export's header row.
#[derive(Debug, Clone)]
struct ColumnMap {
    offense_date: Option<usize>,
    report_datetime: Option<usize>,
    offense_time: Option<usize>,
    hour: Option<usize>,
    year: Option<usize>,
    month: Option<usize>,
    day: Option<usize>,
    offense: Option<usize>,
    offense_sub_category: Option<usize>,
    block_address: Option<usize>,
    neighborhood: Option<usize>,
    precinct: Option<usize>,
    sector: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    hazard_score: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let map = Self {
            offense_date: find(headers, OFFENSE_DATE_COLUMNS),
            report_datetime: find(headers, REPORT_DATETIME_COLUMNS),
            offense_time: find(headers, OFFENSE_TIME_COLUMNS),
            hour: find(headers, HOUR_COLUMNS),
            year: find(headers, YEAR_COLUMNS),
            month: find(headers, MONTH_COLUMNS),
            day: find(headers, DAY_COLUMNS),
            offense: find(headers, OFFENSE_COLUMNS),
            offense_sub_category: find(headers, SUB_CATEGORY_COLUMNS),
            block_address: find(headers, ADDRESS_COLUMNS),
            neighborhood: find(headers, AREA_COLUMNS),
            precinct: find(headers, PRECINCT_COLUMNS),
            sector: find(headers, SECTOR_COLUMNS),
            latitude: find(headers, LATITUDE_COLUMNS),
            longitude: find(headers, LONGITUDE_COLUMNS),
            hazard_score: find(headers, HAZARD_COLUMNS),
        };

        if map.offense.is_none() {
            return Err(IngestError::MissingColumns {
                missing: format!("an offense column (one of {OFFENSE_COLUMNS:?})"),
            });
        }

        let composite_date = map.year.is_some() && map.month.is_some() && map.day.is_some();
        if map.offense_date.is_none() && map.report_datetime.is_none() && !composite_date {
            return Err(IngestError::MissingColumns {
                missing: format!(
                    "a date column (one of {OFFENSE_DATE_COLUMNS:?}, {REPORT_DATETIME_COLUMNS:?}, \
                     or all of {YEAR_COLUMNS:?}/{MONTH_COLUMNS:?}/{DAY_COLUMNS:?})"
                ),
            });
        }

        Ok(map)
    }

    fn raw_record(&self, row: &csv::StringRecord) -> RawRecord {
        RawRecord {
            offense_date: text(row, self.offense_date).or_else(|| self.composite_date(row)),
            report_datetime: text(row, self.report_datetime),
            offense_time: text(row, self.offense_time),
            hour: number(row, self.hour),
            offense: text(row, self.offense),
            offense_sub_category: text(row, self.offense_sub_category),
            block_address: text(row, self.block_address),
            neighborhood: text(row, self.neighborhood),
            precinct: text(row, self.precinct),
            sector: text(row, self.sector),
            latitude: float(row, self.latitude),
            longitude: float(row, self.longitude),
            hazard_score: float(row, self.hazard_score),
        }
    }

    /// Assembles `YYYY-MM-DD` text from split year/month/day columns.
    fn composite_date(&self, row: &csv::StringRecord) -> Option<String> {
        let year = text(row, self.year)?;
        let month = text(row, self.month)?;
        let day = text(row, self.day)?;
        Some(format!("{year}-{month:0>2}-{day:0>2}"))
    }
}

fn find(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        aliases
            .iter()
            .any(|alias| header.trim().eq_ignore_ascii_case(alias))
    })
}

/// Cell text with blanks and redactions collapsed to `None`.
fn text(row: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    let cell = row.get(index?)?.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case(REDACTED) {
        return None;
    }
    Some(cell.to_string())
}

fn float(row: &csv::StringRecord, index: Option<usize>) -> Option<f64> {
    text(row, index)?.parse().ok()
}

fn number(row: &csv::StringRecord, index: Option<usize>) -> Option<i64> {
    text(row, index)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_portal_header_vintage() {
        let csv_text = "\
Offense Start DateTime,Report DateTime,NIBRS Offense Code Description,Offense Sub Category,100 Block Address,MCPP Neighborhood,Precinct,Sector,Latitude,Longitude
05/01/2019 02:30:00 PM,05/02/2019 08:00:00 AM,BURGLARY,RESIDENTIAL,5TH AVE NE,NORTHGATE,N,J,47.70,-122.32
";
        let rows = read_csv(csv_text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.offense_date.as_deref(), Some("05/01/2019 02:30:00 PM"));
        assert_eq!(
            row.report_datetime.as_deref(),
            Some("05/02/2019 08:00:00 AM")
        );
        assert_eq!(row.offense.as_deref(), Some("BURGLARY"));
        assert_eq!(row.offense_sub_category.as_deref(), Some("RESIDENTIAL"));
        assert_eq!(row.block_address.as_deref(), Some("5TH AVE NE"));
        assert_eq!(row.neighborhood.as_deref(), Some("NORTHGATE"));
        assert_eq!(row.precinct.as_deref(), Some("N"));
        assert_eq!(row.sector.as_deref(), Some("J"));
        assert_eq!(row.latitude, Some(47.70));
        assert_eq!(row.longitude, Some(-122.32));
    }

    #[test]
    fn reads_the_split_date_vintage() {
        let csv_text = "\
Offense Year,Offense Month,Offense Day,Offense Time,Offense Category,Block Address,Neighborhood,Hazardness
2019,5,1,14:30:00,CAR PROWL,PINE ST,DOWNTOWN,2.5
";
        let rows = read_csv(csv_text.as_bytes()).unwrap();
        let row = &rows[0];
        assert_eq!(row.offense_date.as_deref(), Some("2019-05-01"));
        assert_eq!(row.offense_time.as_deref(), Some("14:30:00"));
        assert_eq!(row.hazard_score, Some(2.5));
    }

    #[test]
    fn direct_date_column_wins_over_split_columns() {
        let csv_text = "\
Offense Date,Offense Year,Offense Month,Offense Day,Offense Category
2019-05-01,2001,1,1,THEFT
";
        let rows = read_csv(csv_text.as_bytes()).unwrap();
        assert_eq!(rows[0].offense_date.as_deref(), Some("2019-05-01"));
    }

    #[test]
    fn redacted_and_blank_cells_become_absent() {
        let csv_text = "\
Offense Date,Offense Category,Latitude,Longitude,Precinct
2019-05-01,THEFT,REDACTED,redacted,
";
        let rows = read_csv(csv_text.as_bytes()).unwrap();
        let row = &rows[0];
        assert_eq!(row.latitude, None);
        assert_eq!(row.longitude, None);
        assert_eq!(row.precinct, None);
        assert_eq!(row.offense.as_deref(), Some("THEFT"));
    }

    #[test]
    fn headers_match_case_insensitively_with_padding() {
        let csv_text = "\
 offense date , OFFENSE CATEGORY , offense hour
2019-05-01,THEFT,14
";
        let rows = read_csv(csv_text.as_bytes()).unwrap();
        assert_eq!(rows[0].offense_date.as_deref(), Some("2019-05-01"));
        assert_eq!(rows[0].offense.as_deref(), Some("THEFT"));
        assert_eq!(rows[0].hour, Some(14));
    }

    #[test]
    fn unparsable_numeric_cells_become_absent() {
        let csv_text = "\
Offense Date,Offense Category,Latitude,Longitude,Offense Hour
2019-05-01,THEFT,47.61,not-a-number,noon
";
        let rows = read_csv(csv_text.as_bytes()).unwrap();
        assert_eq!(rows[0].latitude, Some(47.61));
        assert_eq!(rows[0].longitude, None);
        assert_eq!(rows[0].hour, None);
    }

    #[test]
    fn ragged_rows_read_as_absent_fields() {
        let csv_text = "\
Offense Date,Offense Category,Latitude
2019-05-01,THEFT
";
        let rows = read_csv(csv_text.as_bytes()).unwrap();
        assert_eq!(rows[0].offense.as_deref(), Some("THEFT"));
        assert_eq!(rows[0].latitude, None);
    }

    #[test]
    fn missing_offense_column_is_fatal() {
        let csv_text = "Offense Date,Latitude\n2019-05-01,47.61\n";
        assert!(matches!(
            read_csv(csv_text.as_bytes()),
            Err(IngestError::MissingColumns { .. })
        ));
    }

    #[test]
    fn missing_every_date_column_is_fatal() {
        let csv_text = "Offense Category,Offense Year,Offense Month\nTHEFT,2019,5\n";
        assert!(matches!(
            read_csv(csv_text.as_bytes()),
            Err(IngestError::MissingColumns { .. })
        ));
    }
}
