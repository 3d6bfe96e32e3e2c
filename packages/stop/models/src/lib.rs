#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Traffic stop record types and the `traffic_stops` column taxonomy.
//!
//! Rows arrive from the database as a loosely typed [`RawTable`] of
//! [`CellValue`]s. The normalizer turns them into a [`StopTable`] of typed
//! [`StopRecord`]s, which is what the predictor and the summary metrics
//! read.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Literal used for missing categorical values after normalization.
pub const UNKNOWN: &str = "Unknown";

/// Stop-duration buckets recorded by the data source, shortest first.
pub const DURATION_BUCKETS: [&str; 3] = ["0-15 Min", "16-30 Min", "30+ Min"];

/// A single loosely typed value, as read from a database row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// SQL `NULL` or otherwise missing.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without a zone.
    DateTime(NaiveDateTime),
    /// Text value.
    Text(String),
}

impl CellValue {
    /// Returns `true` if this value is missing.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the inner string for [`CellValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Error returned when a row's width doesn't match the table's column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShapeError {
    /// Number of columns in the table.
    pub expected: usize,
    /// Number of values in the rejected row.
    pub actual: usize,
}

impl std::fmt::Display for RowShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row has {} values but the table has {} columns",
            self.actual, self.expected
        )
    }
}

impl std::error::Error for RowShapeError {}

/// A rectangular, loosely typed dataset: named columns and rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Creates an empty table with the given column names.
    #[must_use]
    pub const fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    ///
    /// # Errors
    ///
    /// Returns [`RowShapeError`] if the row width differs from the column
    /// count.
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), RowShapeError> {
        if row.len() != self.columns.len() {
            return Err(RowShapeError {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in source order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Position of the named column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The columns of the `traffic_stops` table that map onto [`StopRecord`].
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StopColumn {
    /// Date of the stop
    StopDate,
    /// Time of day of the stop
    StopTime,
    /// Jurisdiction the stop happened in
    CountryName,
    /// Driver gender (`M`, `F`)
    DriverGender,
    /// Driver age in years
    DriverAge,
    /// Driver race
    DriverRace,
    /// Violation the driver was stopped for
    Violation,
    /// Whether a search was conducted
    SearchConducted,
    /// Kind of search
    SearchType,
    /// Outcome of the stop (Citation, Warning, Arrest, ...)
    StopOutcome,
    /// Whether the driver was arrested
    IsArrested,
    /// Stop duration bucket
    StopDuration,
    /// Whether the stop was drug related
    DrugsRelatedStop,
    /// Vehicle identifier
    VehicleNumber,
}

/// How the normalizer treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free categorical text, missing becomes [`UNKNOWN`].
    Categorical,
    /// Boolean flag, missing becomes `false`.
    Boolean,
    /// Non-negative integer, missing becomes the median.
    Age,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Text left as-is.
    Text,
}

impl StopColumn {
    /// Returns how this column is coerced during normalization.
    #[must_use]
    pub const fn kind(self) -> ColumnKind {
        match self {
            Self::DriverGender
            | Self::DriverRace
            | Self::CountryName
            | Self::Violation
            | Self::StopOutcome
            | Self::SearchType
            | Self::StopDuration => ColumnKind::Categorical,
            Self::SearchConducted | Self::DrugsRelatedStop | Self::IsArrested => {
                ColumnKind::Boolean
            }
            Self::DriverAge => ColumnKind::Age,
            Self::StopDate => ColumnKind::Date,
            Self::StopTime => ColumnKind::Time,
            Self::VehicleNumber => ColumnKind::Text,
        }
    }

    /// Returns all variants in `traffic_stops` column order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::StopDate,
            Self::StopTime,
            Self::CountryName,
            Self::DriverGender,
            Self::DriverAge,
            Self::DriverRace,
            Self::Violation,
            Self::SearchConducted,
            Self::SearchType,
            Self::StopOutcome,
            Self::IsArrested,
            Self::StopDuration,
            Self::DrugsRelatedStop,
            Self::VehicleNumber,
        ]
    }
}

/// One row of the `traffic_stops` table after normalization.
///
/// A `None` on a categorical, boolean, or age field means the column is not
/// present in the dataset; once a column is present every record carries a
/// value for it. Date, time, and vehicle number may be `None` per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRecord {
    /// Date of the stop.
    pub stop_date: Option<NaiveDate>,
    /// Time of day of the stop.
    pub stop_time: Option<NaiveTime>,
    /// Jurisdiction name.
    pub country_name: Option<String>,
    /// Driver gender.
    pub driver_gender: Option<String>,
    /// Driver age in whole years.
    pub driver_age: Option<u32>,
    /// Driver race.
    pub driver_race: Option<String>,
    /// Violation.
    pub violation: Option<String>,
    /// Whether a search was conducted.
    pub search_conducted: Option<bool>,
    /// Kind of search.
    pub search_type: Option<String>,
    /// Stop outcome.
    pub stop_outcome: Option<String>,
    /// Whether the driver was arrested.
    pub is_arrested: Option<bool>,
    /// Stop duration bucket.
    pub stop_duration: Option<String>,
    /// Whether the stop was drug related.
    pub drugs_related_stop: Option<bool>,
    /// Vehicle identifier.
    pub vehicle_number: Option<String>,
}

impl StopRecord {
    /// Returns the value of `column` as a [`CellValue`].
    #[must_use]
    pub fn cell(&self, column: StopColumn) -> CellValue {
        fn text(v: Option<&String>) -> CellValue {
            v.map_or(CellValue::Null, |s| CellValue::Text(s.clone()))
        }
        fn flag(v: Option<bool>) -> CellValue {
            v.map_or(CellValue::Null, CellValue::Bool)
        }

        match column {
            StopColumn::StopDate => self.stop_date.map_or(CellValue::Null, CellValue::Date),
            StopColumn::StopTime => self.stop_time.map_or(CellValue::Null, CellValue::Time),
            StopColumn::CountryName => text(self.country_name.as_ref()),
            StopColumn::DriverGender => text(self.driver_gender.as_ref()),
            StopColumn::DriverAge => self
                .driver_age
                .map_or(CellValue::Null, |a| CellValue::Int(i64::from(a))),
            StopColumn::DriverRace => text(self.driver_race.as_ref()),
            StopColumn::Violation => text(self.violation.as_ref()),
            StopColumn::SearchConducted => flag(self.search_conducted),
            StopColumn::SearchType => text(self.search_type.as_ref()),
            StopColumn::StopOutcome => text(self.stop_outcome.as_ref()),
            StopColumn::IsArrested => flag(self.is_arrested),
            StopColumn::StopDuration => text(self.stop_duration.as_ref()),
            StopColumn::DrugsRelatedStop => flag(self.drugs_related_stop),
            StopColumn::VehicleNumber => text(self.vehicle_number.as_ref()),
        }
    }
}

/// The normalized dataset: the columns that survived normalization and
/// one typed record per source row, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTable {
    columns: Vec<StopColumn>,
    records: Vec<StopRecord>,
}

impl StopTable {
    /// Creates a table from its present columns and records.
    #[must_use]
    pub const fn new(columns: Vec<StopColumn>, records: Vec<StopRecord>) -> Self {
        Self { columns, records }
    }

    /// Columns present in the dataset, in source order.
    #[must_use]
    pub fn columns(&self) -> &[StopColumn] {
        &self.columns
    }

    /// Returns `true` if `column` is present.
    #[must_use]
    pub fn has_column(&self, column: StopColumn) -> bool {
        self.columns.contains(&column)
    }

    /// Records in source order.
    #[must_use]
    pub fn records(&self) -> &[StopRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Converts back to a [`RawTable`] holding only the present columns.
    #[must_use]
    pub fn to_raw(&self) -> RawTable {
        RawTable {
            columns: self.columns.iter().map(ToString::to_string).collect(),
            rows: self
                .records
                .iter()
                .map(|r| self.columns.iter().map(|c| r.cell(*c)).collect())
                .collect(),
        }
    }
}
