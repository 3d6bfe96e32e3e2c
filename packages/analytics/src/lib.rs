#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics over the traffic stop log.
//!
//! Catalog queries run against the database through [`executor`]. The
//! predictor, key metrics, and demographic breakdown read the normalized
//! in-memory copy held by a [`dataset::StopDataset`].

pub mod dataset;
pub mod executor;
pub mod metrics;
pub mod predictor;
pub mod summary;

mod counts;

use std::time::Duration;

use enforceiq_catalog::CatalogError;
use enforceiq_database::DbError;
use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A catalog query failed at the data source.
    #[error("Query '{label}' failed: {source}")]
    QueryExecution {
        /// Label of the query that failed.
        label: String,
        /// Underlying database failure.
        #[source]
        source: DbError,
    },

    /// A catalog query did not finish in time.
    #[error("Query '{label}' timed out after {}s", .timeout.as_secs())]
    QueryTimeout {
        /// Label of the query that timed out.
        label: String,
        /// Limit that was exceeded.
        timeout: Duration,
    },

    /// Catalog lookup error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Database error outside of catalog execution.
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}
