//! Filter validation and the shared match predicate.
//!
//! Every query operation validates the filter once, before touching the
//! table, and then applies [`matches`] to each incident. Dimensions apply
//! in a fixed order: date, hour, category, area, then radius.

use crime_dash_analytics_models::FilterSpec;
use crime_dash_incident_models::CanonicalIncident;
use crime_dash_spatial::distance_meters;

use crate::AnalyticsError;

/// Rejects contradictory or out-of-range filters.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] when the date or hour range
/// is inverted, an hour falls outside `0..=23`, or the radius is not a
/// finite non-negative distance around finite coordinates.
pub fn validate(spec: &FilterSpec) -> Result<(), AnalyticsError> {
    if let Some((start, end)) = spec.date_range
        && start > end
    {
        return Err(AnalyticsError::InvalidFilter {
            message: format!("date range starts {start}, after it ends {end}"),
        });
    }

    if let Some((from, to)) = spec.hour_range {
        if from > 23 || to > 23 {
            return Err(AnalyticsError::InvalidFilter {
                message: format!("hours must fall within 0..=23, got {from}..={to}"),
            });
        }
        if from > to {
            return Err(AnalyticsError::InvalidFilter {
                message: format!("hour range starts {from}, after it ends {to}"),
            });
        }
    }

    if let Some(radius) = &spec.radius {
        if !radius.center.latitude.is_finite() || !radius.center.longitude.is_finite() {
            return Err(AnalyticsError::InvalidFilter {
                message: "radius center coordinates must be finite".to_string(),
            });
        }
        if !radius.meters.is_finite() || radius.meters < 0.0 {
            return Err(AnalyticsError::InvalidFilter {
                message: format!(
                    "radius must be a finite non-negative distance in meters, got {}",
                    radius.meters
                ),
            });
        }
    }

    Ok(())
}

/// Whether one incident passes every constrained dimension.
///
/// Bounds are inclusive on both ends. An incident without an area never
/// passes an area constraint, and one without coordinates never passes a
/// radius constraint.
#[must_use]
pub fn matches(incident: &CanonicalIncident, spec: &FilterSpec) -> bool {
    if let Some((start, end)) = spec.date_range
        && (incident.date < start || incident.date > end)
    {
        return false;
    }

    if let Some((from, to)) = spec.hour_range
        && (incident.hour < from || incident.hour > to)
    {
        return false;
    }

    if let Some(categories) = &spec.categories
        && !categories.contains(&incident.crime_against_category)
    {
        return false;
    }

    if let Some(areas) = &spec.areas
        && !incident
            .area
            .as_deref()
            .is_some_and(|area| areas.contains(area))
    {
        return false;
    }

    if let Some(radius) = &spec.radius {
        let Some(location) = incident.location else {
            return false;
        };
        if distance_meters(radius.center, location) > radius.meters {
            return false;
        }
    }

    true
}
