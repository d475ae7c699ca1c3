#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query engine over the canonical incident table.
//!
//! Every operation takes a [`FilterSpec`](crime_dash_analytics_models::FilterSpec)
//! and scans the table directly; results are computed fresh on every call,
//! never cached. Queries see incidents through one shared predicate, so
//! the aggregate totals, rankings, and detail listings for the same filter
//! always describe the same set of rows.

pub mod filter;
pub mod query;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The filter itself is contradictory or out of range; rejected before
    /// any incident is scanned.
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// Description of what is wrong with the filter.
        message: String,
    },
}
