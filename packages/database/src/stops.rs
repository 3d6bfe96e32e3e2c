//! Reads from the `traffic_stops` table.
//!
//! Rows come back as loosely typed [`RawTable`]s; the normalizer is
//! responsible for turning them into typed records.

use enforceiq_stop_models::{CellValue, RawTable};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

/// Table holding one row per recorded stop.
pub const STOPS_TABLE: &str = "traffic_stops";

/// Loads the full stop log.
///
/// # Errors
///
/// * If the query fails
/// * If the rows do not share a common shape
pub async fn load_stops(db: &dyn Database) -> Result<RawTable, DbError> {
    let table = query_table(db, &format!("SELECT * FROM {STOPS_TABLE}")).await?;
    log::info!(
        "Loaded {} stops with {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Counts rows in the stop log.
///
/// # Errors
///
/// * If the query fails
/// * If the count cannot be read
pub async fn count_stops(db: &dyn Database) -> Result<u64, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT COUNT(*) AS stop_count FROM {STOPS_TABLE}"),
            &[],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Count query returned no rows".to_string(),
    })?;

    let count: i64 = row.to_value("stop_count").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse stop count: {e}"),
    })?;

    u64::try_from(count).map_err(|e| DbError::Conversion {
        message: format!("Negative stop count {count}: {e}"),
    })
}

/// Runs a read-only query and returns every row.
///
/// # Errors
///
/// * If the query fails
/// * If the rows do not share a common shape
pub async fn query_table(db: &dyn Database, sql: &str) -> Result<RawTable, DbError> {
    let rows = db.query_raw_params(sql, &[]).await?;
    rows_to_table(&rows)
}

/// Converts database rows into a [`RawTable`], taking the column order
/// from the first row. An empty result yields a table with no columns.
///
/// # Errors
///
/// * If a row's width differs from the first row's
pub fn rows_to_table(rows: &[Row]) -> Result<RawTable, DbError> {
    let Some(first) = rows.first() else {
        return Ok(RawTable::default());
    };

    let columns = first
        .columns
        .iter()
        .map(|(name, _)| name.clone())
        .collect::<Vec<_>>();
    let mut table = RawTable::new(columns);

    for row in rows {
        let cells = row
            .columns
            .iter()
            .map(|(_, value)| cell_from_database_value(value))
            .collect();
        table.push_row(cells).map_err(|e| DbError::Conversion {
            message: e.to_string(),
        })?;
    }

    Ok(table)
}

/// Converts a single database value into a [`CellValue`].
#[must_use]
pub fn cell_from_database_value(value: &DatabaseValue) -> CellValue {
    match value {
        DatabaseValue::Null => CellValue::Null,
        DatabaseValue::String(s) => CellValue::Text(s.clone()),
        DatabaseValue::Bool(b) => CellValue::Bool(*b),
        DatabaseValue::Int32(i) => CellValue::Int(i64::from(*i)),
        DatabaseValue::Int64(i) => CellValue::Int(*i),
        DatabaseValue::Real64(x) => CellValue::Float(*x),
        DatabaseValue::DateTime(dt) => CellValue::DateTime(*dt),
        other => {
            log::trace!("Rendering unmapped database value as text: {other:?}");
            CellValue::Text(format!("{other:?}"))
        }
    }
}
