#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! City bounding box and great-circle distance helpers.
//!
//! The normalizer uses [`SEATTLE_BOUNDS`] to decide whether source
//! coordinates are plausible, and the radius filter in aggregation uses
//! [`distance_meters`] for its great-circle test.

use crime_dash_incident_models::GeoPoint;
use geo::{Distance, Haversine, Point};

/// Inclusive latitude/longitude box bounding a city's plausible extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityBounds {
    /// Southern edge, decimal degrees.
    pub min_latitude: f64,
    /// Northern edge, decimal degrees.
    pub max_latitude: f64,
    /// Western edge, decimal degrees.
    pub min_longitude: f64,
    /// Eastern edge, decimal degrees.
    pub max_longitude: f64,
}

/// Bounding box used to validate Seattle incident coordinates.
///
/// Matches the coordinate filter the source dataset itself applies; wide
/// enough to keep incidents just outside city limits that the city's
/// police data still carries.
pub const SEATTLE_BOUNDS: CityBounds = CityBounds {
    min_latitude: 47.0,
    max_latitude: 48.1,
    min_longitude: -123.5,
    max_longitude: -121.0,
};

impl CityBounds {
    /// Whether the point lies inside the box (edges inclusive).
    ///
    /// Non-finite coordinates are never contained.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

/// Great-circle (haversine) distance between two points, in meters.
#[must_use]
pub fn distance_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let origin = Point::new(from.longitude, from.latitude);
    let destination = Point::new(to.longitude, to.latitude);
    Haversine.distance(origin, destination)
}
