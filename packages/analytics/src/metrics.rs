//! Headline metrics over the normalized stop log.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike as _;
use enforceiq_analytics_models::{DemographicCount, KeyMetrics, SummaryCount, ViolationCount};
use enforceiq_stop_models::{DURATION_BUCKETS, StopTable, UNKNOWN};

use crate::counts::{most_common, ranked};

/// Computes the dashboard's key metrics.
#[must_use]
pub fn key_metrics(table: &StopTable) -> KeyMetrics {
    let records = table.records();

    let total_stops = records.len() as u64;
    let total_arrests = records
        .iter()
        .filter(|r| r.is_arrested == Some(true))
        .count() as u64;

    let outcomes = || records.iter().filter_map(|r| r.stop_outcome.as_deref());
    let violations = || records.iter().filter_map(|r| r.violation.as_deref());

    let distinct_outcomes = outcomes().collect::<BTreeSet<_>>().len() as u64;
    let distinct_violations = violations().collect::<BTreeSet<_>>().len() as u64;

    let violation_counts = ranked(violations())
        .into_iter()
        .map(|(violation, count)| ViolationCount {
            violation: violation.to_string(),
            count,
        })
        .collect();

    KeyMetrics {
        total_stops,
        total_arrests,
        distinct_outcomes,
        distinct_violations,
        top_outcome: most_common(outcomes()).map(ToString::to_string),
        violation_counts,
        summary: vec![
            SummaryCount {
                metric: "Total Stops".to_string(),
                count: total_stops,
            },
            SummaryCount {
                metric: "Total Arrests".to_string(),
                count: total_arrests,
            },
        ],
    }
}

/// Counts stops per (gender, year, country, outcome), ordered by that key.
/// Stops without a date are skipped.
#[must_use]
pub fn demographic_breakdown(table: &StopTable) -> Vec<DemographicCount> {
    let mut groups: BTreeMap<(&str, i32, &str, &str), u64> = BTreeMap::new();

    for record in table.records() {
        let Some(date) = record.stop_date else {
            continue;
        };
        let key = (
            record.driver_gender.as_deref().unwrap_or(UNKNOWN),
            date.year(),
            record.country_name.as_deref().unwrap_or(UNKNOWN),
            record.stop_outcome.as_deref().unwrap_or(UNKNOWN),
        );
        *groups.entry(key).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|((gender, year, country, outcome), count)| DemographicCount {
            driver_gender: gender.to_string(),
            year,
            country_name: country.to_string(),
            stop_outcome: outcome.to_string(),
            count,
        })
        .collect()
}

/// Sorted distinct duration buckets seen in the data, or the standard
/// buckets when the data has none.
#[must_use]
pub fn duration_options(table: &StopTable) -> Vec<String> {
    let seen = table
        .records()
        .iter()
        .filter_map(|r| r.stop_duration.as_deref())
        .collect::<BTreeSet<_>>();

    if seen.is_empty() {
        return DURATION_BUCKETS.iter().map(ToString::to_string).collect();
    }

    seen.into_iter().map(ToString::to_string).collect()
}
