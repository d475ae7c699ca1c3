#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row-level rejection taxonomy and the per-run ingestion summary.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Why one raw row was dropped during ingestion.
///
/// Rejections are counted in the [`IngestSummary`], never raised as
/// errors; a bad row must not abort the run.
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
pub enum RejectReason {
    /// The row carried no date-bearing field or no offense field at all.
    MissingRequiredField,
    /// A date field was present but matched none of the known formats.
    UnparsableDate,
    /// No time source (time string, datetime component, or explicit hour)
    /// yielded a valid 0-23 hour.
    UnparsableTime,
    /// The occurrence date falls before 2008-01-01 or after the
    /// processing date.
    DateOutOfRange,
    /// The offense text was empty after trimming.
    EmptyOffense,
    /// A coordinate was present but not a finite number.
    InvalidCoordinates,
}

impl RejectReason {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::MissingRequiredField,
            Self::UnparsableDate,
            Self::UnparsableTime,
            Self::DateOutOfRange,
            Self::EmptyOffense,
            Self::InvalidCoordinates,
        ]
    }
}

/// Result of one complete ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Total raw rows read from the source.
    pub raw_rows: u64,
    /// Rows that survived parsing and normalization.
    pub accepted: u64,
    /// Dropped rows, counted per rejection reason.
    pub rejected: BTreeMap<RejectReason, u64>,
    /// How long the run took.
    pub duration: Duration,
}

impl IngestSummary {
    /// Counts one dropped row.
    pub fn record_rejection(&mut self, reason: RejectReason) {
        *self.rejected.entry(reason).or_insert(0) += 1;
    }

    /// Total rows dropped across all reasons.
    #[must_use]
    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }

    /// Rows dropped for one specific reason.
    #[must_use]
    pub fn rejected_for(&self, reason: RejectReason) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_accumulate_per_reason() {
        let mut summary = IngestSummary::default();
        summary.record_rejection(RejectReason::UnparsableDate);
        summary.record_rejection(RejectReason::UnparsableDate);
        summary.record_rejection(RejectReason::EmptyOffense);

        assert_eq!(summary.rejected_for(RejectReason::UnparsableDate), 2);
        assert_eq!(summary.rejected_for(RejectReason::EmptyOffense), 1);
        assert_eq!(summary.rejected_for(RejectReason::DateOutOfRange), 0);
        assert_eq!(summary.rejected_total(), 3);
    }

    #[test]
    fn reason_display_matches_reporting_vocabulary() {
        assert_eq!(
            RejectReason::MissingRequiredField.to_string(),
            "MISSING_REQUIRED_FIELD"
        );
        assert_eq!(
            "UNPARSABLE_TIME".parse::<RejectReason>(),
            Ok(RejectReason::UnparsableTime)
        );
    }
}
