#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Query tier and definition types for the analytical query catalog.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The two tiers the catalog is split into.
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
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum QueryTier {
    /// Single-table aggregations (the "medium" queries)
    #[strum(to_string = "standard", serialize = "medium")]
    Standard,
    /// Window functions, joins, and subqueries (the "complex" queries)
    #[strum(to_string = "advanced", serialize = "complex")]
    Advanced,
}

impl QueryTier {
    /// Heading shown above the tier's query list.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Standard => "Medium Queries",
            Self::Advanced => "Complex Queries",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Standard, Self::Advanced]
    }
}

/// One canned analytical query.
///
/// The SQL is complete and self-contained; it is sent to the database
/// verbatim and never modified after the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDefinition {
    label: String,
    tier: QueryTier,
    sql: String,
}

impl QueryDefinition {
    /// Creates a definition.
    #[must_use]
    pub fn new(tier: QueryTier, label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tier,
            sql: sql.into(),
        }
    }

    /// Human-readable label, unique within the tier.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tier this query belongs to.
    #[must_use]
    pub const fn tier(&self) -> QueryTier {
        self.tier
    }

    /// The SQL template.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}
