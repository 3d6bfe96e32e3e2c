#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row-cleaning normalizer for the `traffic_stops` table.
//!
//! Turns a loosely typed [`RawTable`] into a [`StopTable`] of typed
//! [`StopRecord`]s. Missing categorical values become
//! [`UNKNOWN`](enforceiq_stop_models::UNKNOWN), missing flags become
//! `false`, and missing ages are imputed with the dataset median. Values that
//! can't be coerced are treated as missing; nothing here fails.

pub mod parsing;

use chrono::{NaiveDate, NaiveTime};
use enforceiq_stop_models::{
    CellValue, ColumnKind, RawTable, StopColumn, StopRecord, StopTable, UNKNOWN,
};

/// Normalizes a raw table into typed stop records. The input is left
/// untouched.
///
/// Columns that are entirely missing are dropped, as are date, time, age,
/// and vehicle columns in which no value survives coercion. Columns outside
/// the [`StopColumn`] set are ignored.
#[must_use]
pub fn normalize(raw: &RawTable) -> StopTable {
    let mut records = vec![StopRecord::default(); raw.len()];
    let mut columns = Vec::new();

    for (column, idx) in present_columns(raw) {
        let cells: Vec<&CellValue> = raw
            .rows()
            .iter()
            .map(|row| row.get(idx).unwrap_or(&CellValue::Null))
            .collect();

        let kept = match column.kind() {
            ColumnKind::Categorical => {
                for (record, cell) in records.iter_mut().zip(&cells) {
                    if let Some(field) = text_field(record, column) {
                        *field =
                            Some(parsing::coerce_text(cell).unwrap_or_else(|| UNKNOWN.to_string()));
                    }
                }
                true
            }
            ColumnKind::Boolean => {
                for (record, cell) in records.iter_mut().zip(&cells) {
                    if let Some(field) = flag_field(record, column) {
                        *field = Some(parsing::coerce_bool(cell).unwrap_or(false));
                    }
                }
                true
            }
            ColumnKind::Age => fill_ages(&mut records, &cells),
            ColumnKind::Date => assign_if_any(&mut records, &cells, parsing::coerce_date, set_date),
            ColumnKind::Time => assign_if_any(&mut records, &cells, parsing::coerce_time, set_time),
            ColumnKind::Text => assign_if_any(
                &mut records,
                &cells,
                parsing::coerce_text,
                |record: &mut StopRecord, value| {
                    if let Some(field) = text_field(record, column) {
                        *field = value;
                    }
                },
            ),
        };

        if kept {
            columns.push(column);
        } else {
            log::warn!("Column '{column}' has no usable values after coercion, dropping it");
        }
    }

    log::debug!(
        "Normalized {} stop records across {} columns",
        records.len(),
        columns.len()
    );

    StopTable::new(columns, records)
}

/// Known columns that hold at least one non-missing value, paired with
/// their position in the raw table. The first occurrence of a duplicated
/// name wins.
fn present_columns(raw: &RawTable) -> Vec<(StopColumn, usize)> {
    let mut present: Vec<(StopColumn, usize)> = Vec::new();

    for (idx, name) in raw.columns().iter().enumerate() {
        let Ok(column) = name.parse::<StopColumn>() else {
            log::trace!("Ignoring column '{name}'");
            continue;
        };
        if present.iter().any(|(c, _)| *c == column) {
            continue;
        }
        let all_missing = raw
            .rows()
            .iter()
            .all(|row| row.get(idx).is_none_or(CellValue::is_null));
        if all_missing {
            log::debug!("Dropping entirely empty column '{name}'");
            continue;
        }
        present.push((column, idx));
    }

    present
}

/// Imputes missing ages with the floored median of the present ones and
/// floors every age to whole years.
///
/// Returns `false` without touching the records when no age survives
/// coercion.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_ages(records: &mut [StopRecord], cells: &[&CellValue]) -> bool {
    let ages: Vec<Option<f64>> = cells.iter().map(|c| parsing::coerce_age(*c)).collect();

    let Some(median) = median(ages.iter().flatten().copied().collect()) else {
        return false;
    };
    let fill = median.floor() as u32;

    for (record, age) in records.iter_mut().zip(ages) {
        record.driver_age = Some(age.map_or(fill, |a| a.floor() as u32));
    }
    true
}

/// Median of the given values; the mean of the two middle values for an
/// even count.
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Coerces every cell and assigns the results, unless all of them came out
/// missing.
fn assign_if_any<T>(
    records: &mut [StopRecord],
    cells: &[&CellValue],
    coerce: impl Fn(&CellValue) -> Option<T>,
    mut set: impl FnMut(&mut StopRecord, Option<T>),
) -> bool {
    let values: Vec<Option<T>> = cells.iter().map(|c| coerce(*c)).collect();
    if values.iter().all(Option::is_none) {
        return false;
    }
    for (record, value) in records.iter_mut().zip(values) {
        set(record, value);
    }
    true
}

fn set_date(record: &mut StopRecord, value: Option<NaiveDate>) {
    record.stop_date = value;
}

fn set_time(record: &mut StopRecord, value: Option<NaiveTime>) {
    record.stop_time = value;
}

fn text_field(record: &mut StopRecord, column: StopColumn) -> Option<&mut Option<String>> {
    match column {
        StopColumn::CountryName => Some(&mut record.country_name),
        StopColumn::DriverGender => Some(&mut record.driver_gender),
        StopColumn::DriverRace => Some(&mut record.driver_race),
        StopColumn::Violation => Some(&mut record.violation),
        StopColumn::SearchType => Some(&mut record.search_type),
        StopColumn::StopOutcome => Some(&mut record.stop_outcome),
        StopColumn::StopDuration => Some(&mut record.stop_duration),
        StopColumn::VehicleNumber => Some(&mut record.vehicle_number),
        _ => None,
    }
}

fn flag_field(record: &mut StopRecord, column: StopColumn) -> Option<&mut Option<bool>> {
    match column {
        StopColumn::SearchConducted => Some(&mut record.search_conducted),
        StopColumn::DrugsRelatedStop => Some(&mut record.drugs_related_stop),
        StopColumn::IsArrested => Some(&mut record.is_arrested),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        let mut raw = RawTable::new(columns.iter().map(ToString::to_string).collect());
        for row in rows {
            raw.push_row(row).unwrap();
        }
        raw
    }

    fn messy_table() -> RawTable {
        table(
            &[
                "stop_date",
                "stop_time",
                "country_name",
                "driver_gender",
                "driver_age",
                "driver_race",
                "violation",
                "search_conducted",
                "search_type",
                "stop_outcome",
                "is_arrested",
                "stop_duration",
                "drugs_related_stop",
                "vehicle_number",
                "county_name",
            ],
            vec![
                vec![
                    text("2020-01-02"),
                    text("01:55:00"),
                    text("Canada"),
                    text("M"),
                    text("20"),
                    text("White"),
                    text("Speeding"),
                    CellValue::Bool(true),
                    text("Vehicle Search"),
                    text("Citation"),
                    CellValue::Bool(false),
                    text("0-15 Min"),
                    CellValue::Int(0),
                    text("TN1234"),
                    CellValue::Null,
                ],
                vec![
                    text("garbage"),
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                ],
                vec![
                    text("2021/03/04"),
                    text("23:10"),
                    text("USA"),
                    text("F"),
                    CellValue::Float(40.9),
                    text("Asian"),
                    text("Seatbelt"),
                    text("false"),
                    CellValue::Null,
                    text("Warning"),
                    text("1"),
                    text("30+ Min"),
                    CellValue::Bool(true),
                    CellValue::Null,
                    CellValue::Null,
                ],
                vec![
                    CellValue::Null,
                    text("nonsense"),
                    text("India"),
                    text("M"),
                    text("30"),
                    text("Black"),
                    text("DUI"),
                    CellValue::Bool(false),
                    CellValue::Null,
                    text("Arrest"),
                    CellValue::Bool(true),
                    text("16-30 Min"),
                    CellValue::Bool(false),
                    text("KA9876"),
                    CellValue::Null,
                ],
            ],
        )
    }

    #[test]
    fn missing_age_becomes_median() {
        let raw = table(
            &["driver_age"],
            vec![
                vec![CellValue::Int(20)],
                vec![CellValue::Int(30)],
                vec![CellValue::Null],
                vec![CellValue::Int(40)],
            ],
        );
        let normalized = normalize(&raw);
        let ages: Vec<Option<u32>> = normalized.records().iter().map(|r| r.driver_age).collect();
        assert_eq!(ages, vec![Some(20), Some(30), Some(30), Some(40)]);
    }

    #[test]
    fn even_count_median_is_floored_mean_of_middles() {
        let raw = table(
            &["driver_age"],
            vec![
                vec![CellValue::Int(20)],
                vec![CellValue::Int(25)],
                vec![text("unknown")],
            ],
        );
        let normalized = normalize(&raw);
        assert_eq!(normalized.records()[2].driver_age, Some(22));
    }

    #[test]
    fn designated_fields_are_never_missing() {
        let normalized = normalize(&messy_table());
        assert_eq!(normalized.len(), 4);

        for record in normalized.records() {
            for field in [
                &record.driver_gender,
                &record.driver_race,
                &record.country_name,
                &record.violation,
                &record.stop_outcome,
                &record.search_type,
                &record.stop_duration,
            ] {
                assert!(field.is_some(), "categorical field missing in {record:?}");
            }
            assert!(record.search_conducted.is_some());
            assert!(record.drugs_related_stop.is_some());
            assert!(record.is_arrested.is_some());
            assert!(record.driver_age.is_some());
        }

        let blank = &normalized.records()[1];
        assert_eq!(blank.driver_gender.as_deref(), Some(UNKNOWN));
        assert_eq!(blank.search_conducted, Some(false));
        assert_eq!(blank.driver_age, Some(30));
    }

    #[test]
    fn drops_entirely_empty_columns() {
        let normalized = normalize(&messy_table());
        assert!(normalized.has_column(StopColumn::VehicleNumber));
        assert!(!normalized.columns().iter().any(|c| c.as_ref() == "county_name"));
        assert_eq!(normalized.columns().len(), 14);
    }

    #[test]
    fn unparseable_dates_and_times_keep_the_row() {
        let normalized = normalize(&messy_table());
        let records = normalized.records();
        assert_eq!(records[0].stop_date, NaiveDate::from_ymd_opt(2020, 1, 2));
        assert_eq!(records[1].stop_date, None);
        assert_eq!(records[2].stop_date, NaiveDate::from_ymd_opt(2021, 3, 4));
        assert_eq!(records[2].stop_time, NaiveTime::from_hms_opt(23, 10, 0));
        assert_eq!(records[3].stop_time, None);
    }

    #[test]
    fn coerces_flags_and_floors_ages() {
        let normalized = normalize(&messy_table());
        let records = normalized.records();
        assert_eq!(records[0].drugs_related_stop, Some(false));
        assert_eq!(records[2].is_arrested, Some(true));
        assert_eq!(records[2].search_conducted, Some(false));
        assert_eq!(records[2].driver_age, Some(40));
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(&messy_table());
        let twice = normalize(&once.to_raw());
        assert_eq!(once, twice);
    }

    #[test]
    fn idempotent_when_a_date_column_is_all_garbage() {
        let raw = table(
            &["stop_date", "violation"],
            vec![
                vec![text("nope"), text("Speeding")],
                vec![text("also nope"), CellValue::Null],
            ],
        );
        let once = normalize(&raw);
        assert!(!once.has_column(StopColumn::StopDate));
        assert_eq!(once, normalize(&once.to_raw()));
    }

    #[test]
    fn implausible_age_is_imputed_not_saturated() {
        let raw = table(
            &["driver_age"],
            vec![
                vec![text("1e30")],
                vec![CellValue::Int(22)],
                vec![CellValue::Null],
                vec![CellValue::Int(40)],
            ],
        );
        let normalized = normalize(&raw);
        let ages: Vec<Option<u32>> = normalized.records().iter().map(|r| r.driver_age).collect();
        assert_eq!(ages, vec![Some(31), Some(22), Some(31), Some(40)]);
    }

    #[test]
    fn lone_implausible_age_drops_the_column() {
        let raw = table(
            &["driver_age", "driver_gender"],
            vec![vec![text("1e30"), text("M")], vec![CellValue::Null, text("F")]],
        );
        let normalized = normalize(&raw);
        assert!(!normalized.has_column(StopColumn::DriverAge));
    }

    #[test]
    fn unparseable_age_column_is_skipped() {
        let raw = table(
            &["driver_age", "driver_gender"],
            vec![vec![text("n/a"), text("M")], vec![text("?"), text("F")]],
        );
        let normalized = normalize(&raw);
        assert!(!normalized.has_column(StopColumn::DriverAge));
        assert!(normalized.records().iter().all(|r| r.driver_age.is_none()));
    }

    #[test]
    fn empty_table_has_no_columns() {
        let raw = table(&["driver_gender", "driver_age"], vec![]);
        let normalized = normalize(&raw);
        assert!(normalized.is_empty());
        assert!(normalized.columns().is_empty());
    }

    #[test]
    fn input_is_not_mutated() {
        let raw = messy_table();
        let before = raw.clone();
        let _ = normalize(&raw);
        assert_eq!(raw, before);
    }
}
