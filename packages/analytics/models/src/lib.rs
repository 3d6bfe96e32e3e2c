#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query result, prediction, and summary metric types.
//!
//! These are the shapes handed from the analytics layer to whatever
//! presents them (the HTTP API or the CLI).

use chrono::{NaiveDate, NaiveTime};
use enforceiq_stop_models::{CellValue, RawTable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One result row, keyed by column name in select order.
pub type ResultRow = IndexMap<String, CellValue>;

/// Rows returned by a catalog query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Column names in select order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in the order the database returned them.
    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<RawTable> for ResultTable {
    fn from(raw: RawTable) -> Self {
        let columns = raw.columns().to_vec();
        let rows = raw
            .rows()
            .iter()
            .map(|row| columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect();
        Self { columns, rows }
    }
}

/// Outcome of running a catalog query.
///
/// `Rows` always holds at least one row; a successful query that matched
/// nothing is `NoRows`. Neither is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QueryResult {
    /// A non-empty result set.
    Rows(ResultTable),
    /// The query ran and returned nothing.
    NoRows,
}

impl QueryResult {
    /// Wraps a table, mapping an empty one to [`QueryResult::NoRows`].
    #[must_use]
    pub fn from_table(table: ResultTable) -> Self {
        if table.is_empty() {
            Self::NoRows
        } else {
            Self::Rows(table)
        }
    }

    /// Number of rows returned.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        match self {
            Self::Rows(table) => table.len(),
            Self::NoRows => 0,
        }
    }

    /// The rows, if any.
    #[must_use]
    pub const fn table(&self) -> Option<&ResultTable> {
        match self {
            Self::Rows(table) => Some(table),
            Self::NoRows => None,
        }
    }
}

/// A partial observation to predict from.
///
/// Only gender, age, the two flags, and duration are matched. The remaining
/// fields are carried into the natural-language summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionQuery {
    pub driver_gender: String,
    pub driver_age: u32,
    pub search_conducted: bool,
    pub drugs_related_stop: bool,
    pub stop_duration: String,
    #[serde(default)]
    pub stop_date: Option<NaiveDate>,
    #[serde(default)]
    pub stop_time: Option<NaiveTime>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub driver_race: Option<String>,
    #[serde(default)]
    pub search_type: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
}

/// The predicted outcome and violation for a [`PredictionQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Most frequent outcome in the cohort, or the fallback.
    pub outcome: String,
    /// Most frequent violation in the cohort, or the fallback.
    pub violation: String,
    /// Cohort size. Zero means the fallback pair was returned.
    pub matched_count: usize,
}

impl PredictionResult {
    /// Whether no historical stop matched and the fixed guess was used.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.matched_count == 0
    }
}

/// Number of stops recorded for one violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationCount {
    pub violation: String,
    pub count: u64,
}

/// A named headline count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCount {
    pub metric: String,
    pub count: u64,
}

/// Headline numbers for the loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub total_stops: u64,
    pub total_arrests: u64,
    pub distinct_outcomes: u64,
    pub distinct_violations: u64,
    /// `None` when there are no stops.
    pub top_outcome: Option<String>,
    /// Most frequent first.
    pub violation_counts: Vec<ViolationCount>,
    /// `Total Stops` and `Total Arrests`, for charting.
    pub summary: Vec<SummaryCount>,
}

/// Stops for one (gender, year, country, outcome) group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicCount {
    pub driver_gender: String,
    pub year: i32,
    pub country_name: String,
    pub stop_outcome: String,
    pub count: u64,
}
