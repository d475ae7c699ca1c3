//! Query operations over the canonical incident table.
//!
//! Each operation validates its filter, scans the table once, and builds
//! its result in memory. Nothing is cached between calls; two queries
//! with the same filter can only disagree if the table was rebuilt in
//! between.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crime_dash_analytics_models::{
    AggregateResult, AreaRanking, FilterSpec, GroupCount, RankDirection, RankMetric, SortField,
    SortSpec,
};
use crime_dash_incident_models::{CanonicalIncident, CanonicalTable, CrimeAgainst};

use crate::{AnalyticsError, filter};

/// Row cap for detail listings when the caller does not pass one.
pub const DEFAULT_LIST_LIMIT: usize = 500;

/// Aggregates every incident the filter matches in a single pass.
///
/// Group vectors come back ordered by descending count, tied names
/// ascending. A filter that matches nothing yields the all-zero result.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if the filter is invalid;
/// no incident is scanned in that case.
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(
    table: &CanonicalTable,
    spec: &FilterSpec,
) -> Result<AggregateResult, AnalyticsError> {
    filter::validate(spec)?;

    let mut result = AggregateResult::default();
    let mut by_category: BTreeMap<CrimeAgainst, u64> = BTreeMap::new();
    let mut by_area: BTreeMap<&str, u64> = BTreeMap::new();
    let mut by_sub_category: BTreeMap<&str, u64> = BTreeMap::new();
    let mut hazard_rows = 0_u64;

    for incident in table
        .incidents()
        .iter()
        .filter(|incident| filter::matches(incident, spec))
    {
        result.total_count += 1;
        result.by_hour[usize::from(incident.hour)] += 1;
        *by_category
            .entry(incident.crime_against_category)
            .or_default() += 1;
        if let Some(area) = incident.area.as_deref() {
            *by_area.entry(area).or_default() += 1;
        }
        if let Some(sub_category) = incident.offense_sub_category.as_deref() {
            *by_sub_category.entry(sub_category).or_default() += 1;
        }
        if let Some(score) = incident.hazard_score {
            result.total_hazard += score;
            hazard_rows += 1;
        }
    }

    result.by_category = grouped(
        by_category
            .into_iter()
            .map(|(category, count)| (category.to_string(), count)),
    );
    result.by_area = grouped(
        by_area
            .into_iter()
            .map(|(name, count)| (name.to_string(), count)),
    );
    result.by_sub_category = grouped(
        by_sub_category
            .into_iter()
            .map(|(name, count)| (name.to_string(), count)),
    );
    result.average_hazard =
        (hazard_rows > 0).then(|| result.total_hazard / hazard_rows as f64);

    log::debug!(
        "aggregate matched {} of {} incidents",
        result.total_count,
        table.len()
    );
    Ok(result)
}

/// Lists matching incidents, sorted and capped for a detail view.
///
/// The sort is stable over the table's date ordering, so incidents that
/// tie on the sort field stay in chronological order either direction.
/// Without an explicit `limit` the listing caps at [`DEFAULT_LIST_LIMIT`]
/// rows.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if the filter is invalid;
/// no incident is scanned in that case.
pub fn list<'a>(
    table: &'a CanonicalTable,
    spec: &FilterSpec,
    limit: Option<usize>,
    sort: SortSpec,
) -> Result<Vec<&'a CanonicalIncident>, AnalyticsError> {
    filter::validate(spec)?;

    let mut rows: Vec<&CanonicalIncident> = table
        .incidents()
        .iter()
        .filter(|incident| filter::matches(incident, spec))
        .collect();

    rows.sort_by(|a, b| {
        let ordering = compare_field(a, b, sort.field);
        if sort.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    rows.truncate(limit.unwrap_or(DEFAULT_LIST_LIMIT));

    Ok(rows)
}

/// Ranks areas by incident count or mean hazard over the matching set.
///
/// Ties rank by ascending area name. Incidents without an area are left
/// out entirely, and when ranking by [`RankMetric::AverageHazard`] so are
/// areas where no matching incident carries a score.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if the filter is invalid;
/// no incident is scanned in that case.
#[allow(clippy::cast_precision_loss)]
pub fn rank_areas(
    table: &CanonicalTable,
    spec: &FilterSpec,
    metric: RankMetric,
    direction: RankDirection,
    limit: usize,
) -> Result<Vec<AreaRanking>, AnalyticsError> {
    filter::validate(spec)?;

    #[derive(Default)]
    struct Tally {
        count: u64,
        hazard_total: f64,
        hazard_rows: u64,
    }

    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    for incident in table
        .incidents()
        .iter()
        .filter(|incident| filter::matches(incident, spec))
    {
        let Some(area) = incident.area.as_deref() else {
            continue;
        };
        let tally = tallies.entry(area).or_default();
        tally.count += 1;
        if let Some(score) = incident.hazard_score {
            tally.hazard_total += score;
            tally.hazard_rows += 1;
        }
    }

    let mut rankings: Vec<AreaRanking> = tallies
        .into_iter()
        .map(|(name, tally)| AreaRanking {
            name: name.to_string(),
            count: tally.count,
            average_hazard: (tally.hazard_rows > 0)
                .then(|| tally.hazard_total / tally.hazard_rows as f64),
        })
        .collect();

    if metric == RankMetric::AverageHazard {
        rankings.retain(|ranking| ranking.average_hazard.is_some());
    }

    rankings.sort_by(|a, b| {
        let ordering = match metric {
            RankMetric::Count => a.count.cmp(&b.count),
            RankMetric::AverageHazard => a
                .average_hazard
                .unwrap_or_default()
                .total_cmp(&b.average_hazard.unwrap_or_default()),
        };
        let ordering = match direction {
            RankDirection::Highest => ordering.reverse(),
            RankDirection::Lowest => ordering,
        };
        ordering.then_with(|| a.name.cmp(&b.name))
    });
    rankings.truncate(limit);

    Ok(rankings)
}

fn compare_field(a: &CanonicalIncident, b: &CanonicalIncident, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Hour => a.hour.cmp(&b.hour),
        SortField::Offense => a.offense.cmp(&b.offense),
        SortField::Area => a.area.cmp(&b.area),
        SortField::HazardScore => match (a.hazard_score, b.hazard_score) {
            (Some(left), Some(right)) => left.total_cmp(&right),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        },
    }
}

fn grouped(entries: impl Iterator<Item = (String, u64)>) -> Vec<GroupCount> {
    let mut groups: Vec<GroupCount> = entries
        .map(|(name, count)| GroupCount { name, count })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    groups
}
