#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fixed catalog of canned analytical queries over `traffic_stops`.
//!
//! The catalog is built once from a literal table, split into a standard
//! and an advanced tier, and never mutated afterward. Lookups are by tier
//! and label; labels are unique within a tier and listed in display order.

mod advanced;
pub mod policy;
mod standard;

use std::path::PathBuf;

use enforceiq_catalog_models::{QueryDefinition, QueryTier};
use thiserror::Error;

pub use policy::CatalogPolicy;

/// Errors from catalog lookups and policy loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested label is not present in the tier.
    #[error("Unknown {tier} query: '{label}'")]
    UnknownQuery {
        /// Tier that was searched.
        tier: QueryTier,
        /// Label that was requested.
        label: String,
    },

    /// The policy's thresholds are inconsistent.
    #[error("Invalid catalog policy: {message}")]
    InvalidPolicy {
        /// Description of the problem.
        message: String,
    },

    /// The policy file could not be read.
    #[error("Failed to read catalog policy {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The policy file is not valid TOML.
    #[error("Failed to parse catalog policy: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Read-only registry of query definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCatalog {
    standard: Vec<QueryDefinition>,
    advanced: Vec<QueryDefinition>,
}

impl QueryCatalog {
    /// Builds the catalog with the policy's thresholds rendered into the
    /// templates that use them.
    #[must_use]
    pub fn new(policy: &CatalogPolicy) -> Self {
        let standard = standard::entries(policy)
            .into_iter()
            .map(|(label, sql)| QueryDefinition::new(QueryTier::Standard, label, sql))
            .collect::<Vec<_>>();
        let advanced = advanced::ENTRIES
            .iter()
            .map(|(label, sql)| QueryDefinition::new(QueryTier::Advanced, *label, *sql))
            .collect::<Vec<_>>();

        log::debug!(
            "Built query catalog: {} standard, {} advanced",
            standard.len(),
            advanced.len()
        );

        Self { standard, advanced }
    }

    /// Builds the catalog from the policy named by `CATALOG_POLICY_PATH`.
    ///
    /// # Errors
    ///
    /// * If the policy file cannot be loaded or is invalid
    pub fn from_env() -> Result<Self, CatalogError> {
        Ok(Self::new(&CatalogPolicy::from_env()?))
    }

    /// All definitions in a tier, in display order.
    #[must_use]
    pub fn definitions(&self, tier: QueryTier) -> &[QueryDefinition] {
        match tier {
            QueryTier::Standard => &self.standard,
            QueryTier::Advanced => &self.advanced,
        }
    }

    /// Labels in a tier, in display order.
    #[must_use]
    pub fn labels(&self, tier: QueryTier) -> Vec<&str> {
        self.definitions(tier)
            .iter()
            .map(QueryDefinition::label)
            .collect()
    }

    /// Looks up a definition by tier and label.
    ///
    /// # Errors
    ///
    /// * If `label` is not present in `tier`
    pub fn get(&self, tier: QueryTier, label: &str) -> Result<&QueryDefinition, CatalogError> {
        self.definitions(tier)
            .iter()
            .find(|def| def.label() == label)
            .ok_or_else(|| CatalogError::UnknownQuery {
                tier,
                label: label.to_string(),
            })
    }
}

impl Default for QueryCatalog {
    fn default() -> Self {
        Self::new(&CatalogPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::advanced::EXPECTED_ADVANCED_COUNT;
    use crate::standard::EXPECTED_STANDARD_COUNT;

    #[test]
    fn tier_counts() {
        let catalog = QueryCatalog::default();
        assert_eq!(
            catalog.labels(QueryTier::Standard).len(),
            EXPECTED_STANDARD_COUNT,
            "Update EXPECTED_STANDARD_COUNT after adding/removing queries."
        );
        assert_eq!(
            catalog.labels(QueryTier::Advanced).len(),
            EXPECTED_ADVANCED_COUNT,
            "Update EXPECTED_ADVANCED_COUNT after adding/removing queries."
        );
    }

    #[test]
    fn labels_are_unique_within_tier() {
        let catalog = QueryCatalog::default();
        for &tier in QueryTier::all() {
            let mut seen = BTreeSet::new();
            for label in catalog.labels(tier) {
                assert!(seen.insert(label), "Duplicate {tier} label: {label}");
            }
        }
    }

    #[test]
    fn every_listed_label_resolves() {
        let catalog = QueryCatalog::default();
        for &tier in QueryTier::all() {
            for label in catalog.labels(tier) {
                let def = catalog.get(tier, label).unwrap();
                assert_eq!(def.label(), label);
                assert_eq!(def.tier(), tier);
                assert!(!def.sql().trim().is_empty(), "{label} has empty SQL");
            }
        }
    }

    #[test]
    fn unknown_label_fails() {
        let catalog = QueryCatalog::default();
        let err = catalog.get(QueryTier::Standard, "nonexistent").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnknownQuery { tier: QueryTier::Standard, ref label } if label == "nonexistent"
        ));
    }

    #[test]
    fn label_is_not_found_in_other_tier() {
        let catalog = QueryCatalog::default();
        let label = catalog.labels(QueryTier::Advanced)[0].to_string();
        assert!(catalog.get(QueryTier::Standard, &label).is_err());
    }

    #[test]
    fn labels_keep_display_order() {
        let catalog = QueryCatalog::default();
        for &tier in QueryTier::all() {
            for (i, label) in catalog.labels(tier).into_iter().enumerate() {
                assert!(
                    label.starts_with(&format!("{}. ", i + 1)),
                    "{tier} label out of order: {label}"
                );
            }
        }
    }

    #[test]
    fn catalog_queries_only_read() {
        let catalog = QueryCatalog::default();
        for &tier in QueryTier::all() {
            for def in catalog.definitions(tier) {
                let sql = def.sql().trim_start().to_ascii_lowercase();
                assert!(sql.starts_with("select"), "{} is not a select", def.label());
            }
        }
    }

    #[test]
    fn policy_changes_only_templated_queries() {
        let default = QueryCatalog::default();
        let mut policy = CatalogPolicy::default();
        policy.duration_minutes.long = 40.0;
        let custom = QueryCatalog::new(&policy);

        let label = "7. Average stop duration for different violations?";
        assert!(custom
            .get(QueryTier::Standard, label)
            .unwrap()
            .sql()
            .contains("when '30+ Min' then 40\n"));

        let changed = default
            .definitions(QueryTier::Standard)
            .iter()
            .zip(custom.definitions(QueryTier::Standard))
            .filter(|(a, b)| a.sql() != b.sql())
            .count();
        assert_eq!(changed, 1);
        assert_eq!(
            default.definitions(QueryTier::Advanced),
            custom.definitions(QueryTier::Advanced)
        );
    }
}
