//! The once-loaded, normalized stop log.

use enforceiq_analytics_models::{
    DemographicCount, KeyMetrics, PredictionQuery, PredictionResult,
};
use enforceiq_database::stops::load_stops;
use enforceiq_normalize::normalize;
use enforceiq_stop_models::{RawTable, StopTable};
use switchy_database::Database;

use crate::predictor::Cohort;
use crate::{AnalyticsError, metrics, predictor};

/// Read-only normalized copy of `traffic_stops`.
///
/// Built once at startup and shared; nothing mutates it afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopDataset {
    table: StopTable,
}

impl StopDataset {
    /// Wraps an already normalized table.
    #[must_use]
    pub const fn new(table: StopTable) -> Self {
        Self { table }
    }

    /// Normalizes a raw table.
    #[must_use]
    pub fn from_raw(raw: &RawTable) -> Self {
        let table = normalize(raw);
        log::info!(
            "Normalized {} stops, keeping {} of {} columns",
            table.len(),
            table.columns().len(),
            raw.columns().len()
        );
        Self { table }
    }

    /// Loads and normalizes the full stop log.
    ///
    /// # Errors
    ///
    /// * If the stop log cannot be read
    pub async fn load(db: &dyn Database) -> Result<Self, AnalyticsError> {
        let raw = load_stops(db).await?;
        Ok(Self::from_raw(&raw))
    }

    /// Loads the stop log, or an empty dataset if there is no database or
    /// the load fails.
    pub async fn load_or_empty(db: Option<&dyn Database>) -> Self {
        let Some(db) = db else {
            log::warn!("No database connection; starting with an empty dataset");
            return Self::default();
        };

        match Self::load(db).await {
            Ok(dataset) => dataset,
            Err(e) => {
                log::warn!("Failed to load stops, starting with an empty dataset: {e}");
                Self::default()
            }
        }
    }

    /// The normalized table.
    #[must_use]
    pub const fn table(&self) -> &StopTable {
        &self.table
    }

    /// Number of loaded stops.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no stops are loaded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Stops matching `query`.
    #[must_use]
    pub fn cohort(&self, query: &PredictionQuery) -> Cohort<'_> {
        Cohort::select(&self.table, query)
    }

    /// See [`predictor::predict`].
    #[must_use]
    pub fn predict(&self, query: &PredictionQuery) -> PredictionResult {
        predictor::predict(&self.table, query)
    }

    /// See [`metrics::key_metrics`].
    #[must_use]
    pub fn key_metrics(&self) -> KeyMetrics {
        metrics::key_metrics(&self.table)
    }

    /// See [`metrics::demographic_breakdown`].
    #[must_use]
    pub fn demographic_breakdown(&self) -> Vec<DemographicCount> {
        metrics::demographic_breakdown(&self.table)
    }

    /// See [`metrics::duration_options`].
    #[must_use]
    pub fn duration_options(&self) -> Vec<String> {
        metrics::duration_options(&self.table)
    }
}
