#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter, sort, and result types for incident analytics.
//!
//! A [`FilterSpec`] describes which incidents a query sees; the other
//! types describe how results come back. All of them serialize with
//! camelCase keys for dashboard consumption.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use crime_dash_incident_models::{CrimeAgainst, GeoPoint};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A circular spatial constraint around a center point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusFilter {
    /// Center of the search circle.
    pub center: GeoPoint,
    /// Great-circle radius in meters.
    pub meters: f64,
}

/// Which incidents a query sees.
///
/// Every dimension is optional; `None` leaves that dimension
/// unconstrained, while an empty set constrains it to nothing. The
/// default value matches every incident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Inclusive occurrence date range.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Inclusive hour-of-day range, each end in `0..=23`.
    pub hour_range: Option<(u8, u8)>,
    /// Crime-against groupings to keep.
    pub categories: Option<BTreeSet<CrimeAgainst>>,
    /// Area names to keep, matched exactly.
    pub areas: Option<BTreeSet<String>>,
    /// Spatial constraint; incidents without coordinates never pass it.
    pub radius: Option<RadiusFilter>,
}

/// Incident fields a detail listing can sort on.
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
pub enum SortField {
    /// Occurrence date.
    Date,
    /// Hour of day.
    Hour,
    /// Offense text.
    Offense,
    /// Area name.
    Area,
    /// Hazard score; incidents without one sort first ascending.
    HazardScore,
}

/// Sort order for a detail listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    /// Field to order by.
    pub field: SortField,
    /// Whether to reverse into descending order.
    pub descending: bool,
}

impl Default for SortSpec {
    /// Most recent incidents first.
    fn default() -> Self {
        Self {
            field: SortField::Date,
            descending: true,
        }
    }
}

/// Measure to rank areas by.
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
pub enum RankMetric {
    /// Incident count.
    Count,
    /// Mean hazard score across incidents that carry one.
    AverageHazard,
}

/// Whether a ranking starts from the largest or smallest metric value.
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
pub enum RankDirection {
    /// Largest metric value first.
    Highest,
    /// Smallest metric value first.
    Lowest,
}

/// One named group and its incident count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    /// Group name.
    pub name: String,
    /// Incidents in the group.
    pub count: u64,
}

/// One area's standing in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRanking {
    /// Area name.
    pub name: String,
    /// Incidents in the area that matched the filter.
    pub count: u64,
    /// Mean hazard score, absent when no matching incident carries one.
    pub average_hazard: Option<f64>,
}

/// Aggregate counts over every incident a filter matched.
///
/// Group vectors are ordered by descending count, tied names ascending.
/// An empty match produces the default value: zero totals everywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Total matched incidents.
    pub total_count: u64,
    /// Counts per crime-against grouping.
    pub by_category: Vec<GroupCount>,
    /// Counts per hour of day, dense over `0..=23`.
    pub by_hour: [u64; 24],
    /// Counts per area, for incidents that have one.
    pub by_area: Vec<GroupCount>,
    /// Counts per offense sub category, for incidents that have one.
    pub by_sub_category: Vec<GroupCount>,
    /// Sum of hazard scores over incidents that carry one.
    pub total_hazard: f64,
    /// Mean hazard score, absent when no matched incident carries one.
    pub average_hazard: Option<f64>,
}
