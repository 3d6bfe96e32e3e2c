//! Runs catalog queries against the database.
//!
//! [`execute`] is the strict contract: a failure is an error. [`execute_label`]
//! is what the front ends call: it resolves the label, and substitutes an
//! empty result plus a message when the database is unavailable or the
//! query fails.

use std::time::{Duration, Instant};

use enforceiq_analytics_models::{QueryResult, ResultTable};
use enforceiq_catalog::QueryCatalog;
use enforceiq_catalog_models::{QueryDefinition, QueryTier};
use enforceiq_database::DbError;
use enforceiq_database::stops::query_table;
use switchy_database::Database;

use crate::AnalyticsError;

/// Message shown when a query produced nothing to display.
pub const NO_DATA_MESSAGE: &str = "No data found for the selected query.";

/// Runs a definition's SQL verbatim, bounded by `timeout`.
///
/// # Errors
///
/// * [`AnalyticsError::QueryTimeout`] if the query does not finish in time
/// * [`AnalyticsError::QueryExecution`] if the database rejects the query
pub async fn execute(
    db: &dyn Database,
    definition: &QueryDefinition,
    timeout: Duration,
) -> Result<QueryResult, AnalyticsError> {
    let label = definition.label();
    let start = Instant::now();

    let raw = bounded(label, timeout, query_table(db, definition.sql())).await?;

    log::debug!(
        "Query '{label}' returned {} rows in {:?}",
        raw.len(),
        start.elapsed()
    );

    Ok(QueryResult::from_table(ResultTable::from(raw)))
}

/// Awaits `query` for at most `timeout`, attributing either failure to
/// `label`.
async fn bounded<T>(
    label: &str,
    timeout: Duration,
    query: impl Future<Output = Result<T, DbError>>,
) -> Result<T, AnalyticsError> {
    tokio::time::timeout(timeout, query)
        .await
        .map_err(|_| AnalyticsError::QueryTimeout {
            label: label.to_string(),
            timeout,
        })?
        .map_err(|source| AnalyticsError::QueryExecution {
            label: label.to_string(),
            source,
        })
}

/// A catalog query run, ready to present.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    /// The definition that was run.
    pub definition: QueryDefinition,
    /// Rows returned, or `NoRows`.
    pub result: QueryResult,
    /// Set when there is nothing to display.
    pub message: Option<String>,
}

/// Looks up `label` in `tier` and runs it.
///
/// Execution failures and a missing database degrade to
/// [`QueryResult::NoRows`] with [`NO_DATA_MESSAGE`]; the cause is logged.
///
/// # Errors
///
/// * [`AnalyticsError::Catalog`] if `label` is not in `tier`
pub async fn execute_label(
    db: Option<&dyn Database>,
    catalog: &QueryCatalog,
    tier: QueryTier,
    label: &str,
    timeout: Duration,
) -> Result<QueryReport, AnalyticsError> {
    let definition = catalog.get(tier, label)?.clone();

    let result = match db {
        Some(db) => match execute(db, &definition, timeout).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{e}");
                QueryResult::NoRows
            }
        },
        None => {
            log::warn!("No database connection; '{label}' returns no rows");
            QueryResult::NoRows
        }
    };

    let message = matches!(result, QueryResult::NoRows).then(|| NO_DATA_MESSAGE.to_string());

    Ok(QueryReport {
        definition,
        result,
        message,
    })
}
