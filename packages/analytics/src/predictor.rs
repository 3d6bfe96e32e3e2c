//! Historical-mode outcome predictor.
//!
//! A prediction is a lookup, not a model: the cohort is every normalized
//! stop whose gender, age, search flag, drug flag, and duration bucket
//! equal the query's, and the answer is the cohort's most frequent outcome
//! and violation. An empty cohort yields a fixed guess.

use enforceiq_analytics_models::{PredictionQuery, PredictionResult};
use enforceiq_stop_models::{StopRecord, StopTable};

use crate::counts::most_common;

/// Outcome returned when no historical stop matches.
pub const FALLBACK_OUTCOME: &str = "warning";

/// Violation returned when no historical stop matches.
pub const FALLBACK_VIOLATION: &str = "speeding";

/// Number of matched records the dashboard previews.
pub const DEFAULT_PREVIEW_LEN: usize = 5;

/// Normalized stops that exactly match a [`PredictionQuery`], in table
/// order.
#[derive(Debug, Clone)]
pub struct Cohort<'a> {
    records: Vec<&'a StopRecord>,
}

impl<'a> Cohort<'a> {
    /// Selects the matching records from `table`.
    ///
    /// A record whose matched field is absent (its column was dropped
    /// during normalization) never matches.
    #[must_use]
    pub fn select(table: &'a StopTable, query: &PredictionQuery) -> Self {
        let records = table
            .records()
            .iter()
            .filter(|record| matches(record, query))
            .collect();
        Self { records }
    }

    /// Matched records in table order.
    #[must_use]
    pub fn records(&self) -> &[&'a StopRecord] {
        &self.records
    }

    /// The first `n` matched records.
    #[must_use]
    pub fn preview(&self, n: usize) -> &[&'a StopRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Cohort size.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most frequent outcome among matched records that have one.
    #[must_use]
    pub fn most_common_outcome(&self) -> Option<&'a str> {
        most_common(
            self.records
                .iter()
                .filter_map(|r| r.stop_outcome.as_deref()),
        )
    }

    /// Most frequent violation among matched records that have one.
    #[must_use]
    pub fn most_common_violation(&self) -> Option<&'a str> {
        most_common(self.records.iter().filter_map(|r| r.violation.as_deref()))
    }

    /// Turns the cohort into a prediction, substituting the fallback for
    /// any field the cohort has no values for.
    #[must_use]
    pub fn prediction(&self) -> PredictionResult {
        if self.is_empty() {
            return fallback();
        }

        PredictionResult {
            outcome: self
                .most_common_outcome()
                .unwrap_or(FALLBACK_OUTCOME)
                .to_string(),
            violation: self
                .most_common_violation()
                .unwrap_or(FALLBACK_VIOLATION)
                .to_string(),
            matched_count: self.len(),
        }
    }
}

fn matches(record: &StopRecord, query: &PredictionQuery) -> bool {
    record.driver_gender.as_deref() == Some(query.driver_gender.as_str())
        && record.driver_age == Some(query.driver_age)
        && record.search_conducted == Some(query.search_conducted)
        && record.drugs_related_stop == Some(query.drugs_related_stop)
        && record.stop_duration.as_deref() == Some(query.stop_duration.as_str())
}

fn fallback() -> PredictionResult {
    PredictionResult {
        outcome: FALLBACK_OUTCOME.to_string(),
        violation: FALLBACK_VIOLATION.to_string(),
        matched_count: 0,
    }
}

/// Predicts the outcome and violation for `query` from `table`.
#[must_use]
pub fn predict(table: &StopTable, query: &PredictionQuery) -> PredictionResult {
    let cohort = Cohort::select(table, query);
    let result = cohort.prediction();

    if result.is_fallback() {
        log::debug!(
            "No stops matched gender={} age={} search={} drugs={} duration={}; \
             returning fallback prediction",
            query.driver_gender,
            query.driver_age,
            query.search_conducted,
            query.drugs_related_stop,
            query.stop_duration,
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use enforceiq_stop_models::StopColumn;

    use super::*;

    fn record(
        gender: &str,
        age: u32,
        search: bool,
        drugs: bool,
        duration: &str,
        outcome: &str,
        violation: &str,
    ) -> StopRecord {
        StopRecord {
            driver_gender: Some(gender.to_string()),
            driver_age: Some(age),
            search_conducted: Some(search),
            drugs_related_stop: Some(drugs),
            stop_duration: Some(duration.to_string()),
            stop_outcome: Some(outcome.to_string()),
            violation: Some(violation.to_string()),
            ..StopRecord::default()
        }
    }

    fn table(records: Vec<StopRecord>) -> StopTable {
        StopTable::new(StopColumn::all().to_vec(), records)
    }

    fn query(gender: &str, age: u32, search: bool, drugs: bool, duration: &str) -> PredictionQuery {
        PredictionQuery {
            driver_gender: gender.to_string(),
            driver_age: age,
            search_conducted: search,
            drugs_related_stop: drugs,
            stop_duration: duration.to_string(),
            stop_date: None,
            stop_time: None,
            country_name: None,
            driver_race: None,
            search_type: None,
            vehicle_number: None,
        }
    }

    #[test]
    fn majority_outcome_in_exact_cohort() {
        let table = table(vec![
            record("M", 30, true, false, "0-15 Min", "Citation", "Speeding"),
            record("M", 30, true, false, "0-15 Min", "Warning", "Speeding"),
            record("M", 30, true, false, "0-15 Min", "Citation", "Equipment"),
            record("F", 30, true, false, "0-15 Min", "Arrest", "DUI"),
            record("M", 31, true, false, "0-15 Min", "Arrest", "DUI"),
        ]);

        let result = predict(&table, &query("M", 30, true, false, "0-15 Min"));

        assert_eq!(result.outcome, "Citation");
        assert_eq!(result.violation, "Speeding");
        assert_eq!(result.matched_count, 3);
        assert!(!result.is_fallback());
    }

    #[test]
    fn no_match_returns_fallback() {
        let table = table(vec![
            record("M", 30, true, false, "0-15 Min", "Citation", "Speeding"),
            record("F", 99, true, false, "30+ Min", "Arrest", "DUI"),
        ]);

        let result = predict(&table, &query("F", 99, false, false, "30+ Min"));

        assert_eq!(result.outcome, "warning");
        assert_eq!(result.violation, "speeding");
        assert_eq!(result.matched_count, 0);
        assert!(result.is_fallback());
    }

    #[test]
    fn empty_table_returns_fallback() {
        let result = predict(&StopTable::default(), &query("M", 30, true, false, "0-15 Min"));
        assert!(result.is_fallback());
    }

    #[test]
    fn every_field_must_match() {
        let base = query("M", 30, true, false, "0-15 Min");
        let table = table(vec![
            record("M", 30, true, false, "16-30 Min", "Arrest", "DUI"),
            record("M", 30, true, true, "0-15 Min", "Arrest", "DUI"),
            record("M", 30, false, false, "0-15 Min", "Arrest", "DUI"),
        ]);
        assert_eq!(predict(&table, &base).matched_count, 0);
    }

    #[test]
    fn tie_breaks_on_first_seen() {
        let table = table(vec![
            record("F", 25, false, false, "16-30 Min", "Warning", "Seatbelt"),
            record("F", 25, false, false, "16-30 Min", "Citation", "Speeding"),
        ]);

        let result = predict(&table, &query("F", 25, false, false, "16-30 Min"));
        assert_eq!(result.outcome, "Warning");
        assert_eq!(result.violation, "Seatbelt");
        assert_eq!(result.matched_count, 2);
    }

    #[test]
    fn absent_outcome_column_falls_back_per_field() {
        let mut only = record("M", 40, false, false, "0-15 Min", "x", "Speeding");
        only.stop_outcome = None;
        let table = table(vec![only]);

        let result = predict(&table, &query("M", 40, false, false, "0-15 Min"));
        assert_eq!(result.outcome, FALLBACK_OUTCOME);
        assert_eq!(result.violation, "Speeding");
        assert_eq!(result.matched_count, 1);
    }

    #[test]
    fn preview_is_bounded() {
        let records = (0..8)
            .map(|_| record("M", 30, true, false, "0-15 Min", "Citation", "Speeding"))
            .collect();
        let table = table(records);
        let q = query("M", 30, true, false, "0-15 Min");
        let cohort = Cohort::select(&table, &q);

        assert_eq!(cohort.len(), 8);
        assert_eq!(cohort.preview(DEFAULT_PREVIEW_LEN).len(), 5);
        assert_eq!(cohort.preview(20).len(), 8);
    }
}
