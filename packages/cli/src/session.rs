//! Connection, catalog, and dataset handles shared by the commands.

use std::time::Duration;

use enforceiq_analytics::dataset::StopDataset;
use enforceiq_analytics::executor::{self, QueryReport};
use enforceiq_analytics::AnalyticsError;
use enforceiq_catalog::{CatalogError, QueryCatalog};
use enforceiq_catalog_models::QueryTier;
use enforceiq_database::db::{self, DatabaseConfig};
use switchy_database::Database;

/// What a command needs to run.
pub struct Session {
    db: Option<Box<dyn Database>>,
    catalog: QueryCatalog,
    query_timeout: Duration,
}

impl Session {
    /// Builds the catalog and opens the database described by the
    /// environment.
    ///
    /// An unreachable database is logged and leaves the session without
    /// one.
    ///
    /// # Errors
    ///
    /// * If `CATALOG_POLICY_PATH` names an unreadable or invalid policy
    pub async fn from_env() -> Result<Self, CatalogError> {
        let catalog = QueryCatalog::from_env()?;
        let config = DatabaseConfig::from_env();

        let db = match db::connect(&config).await {
            Ok(db) => Some(db),
            Err(e) => {
                log::warn!("Database unavailable, continuing without it: {e}");
                None
            }
        };

        Ok(Self {
            db,
            catalog,
            query_timeout: config.query_timeout,
        })
    }

    pub const fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    /// Runs a catalog query; see [`executor::execute_label`].
    ///
    /// # Errors
    ///
    /// * If `label` is not in `tier`
    pub async fn run_query(
        &self,
        tier: QueryTier,
        label: &str,
    ) -> Result<QueryReport, AnalyticsError> {
        executor::execute_label(
            self.db.as_deref(),
            &self.catalog,
            tier,
            label,
            self.query_timeout,
        )
        .await
    }

    /// Loads the normalized stop log, empty without a database.
    pub async fn dataset(&self) -> StopDataset {
        StopDataset::load_or_empty(self.db.as_deref()).await
    }
}
