#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the `EnforceIQ` server.
//!
//! These types are serialized to JSON for the REST API. They wrap the
//! analytics types rather than exposing them directly so the API contract
//! can evolve on its own.

use enforceiq_analytics_models::{PredictionResult, QueryResult};
use enforceiq_catalog_models::QueryTier;
use enforceiq_stop_models::StopRecord;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Whether a database connection was established at startup.
    pub database_connected: bool,
    /// Stops held in the normalized in-memory dataset.
    pub loaded_stops: usize,
    /// Rows currently in `traffic_stops`, when the database answers.
    pub stored_stops: Option<u64>,
}

/// Catalog labels for both tiers, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiQueryLabels {
    pub standard: Vec<String>,
    pub advanced: Vec<String>,
}

/// Query string for looking up one catalog entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryLookupParams {
    /// `standard` or `advanced` (also `medium` or `complex`).
    pub tier: String,
    /// Exact catalog label.
    pub label: String,
}

/// Body of `POST /api/query/execute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteQueryRequest {
    pub tier: QueryTier,
    pub label: String,
}

/// Result of running a catalog query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiQueryExecution {
    pub tier: QueryTier,
    pub label: String,
    /// The SQL that was sent to the database.
    pub sql: String,
    pub result: QueryResult,
    /// Set when there is nothing to display.
    pub message: Option<String>,
}

/// Result of `POST /api/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrediction {
    pub prediction: PredictionResult,
    /// True when no historical stop matched and the fixed guess was used.
    pub fallback: bool,
    /// Natural-language summary of the prediction.
    pub summary: String,
    /// The first few matched stops.
    pub preview: Vec<StopRecord>,
}

/// Error body returned with 4xx and 5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_request_uses_lowercase_tier() {
        let request: ExecuteQueryRequest = serde_json::from_value(serde_json::json!({
            "tier": "advanced",
            "label": "1. Yearly Breakdown of Stops and Arrests by Country",
        }))
        .unwrap();
        assert_eq!(request.tier, QueryTier::Advanced);
    }

    #[test]
    fn execution_serializes_no_rows() {
        let body = ApiQueryExecution {
            tier: QueryTier::Standard,
            label: "x".to_string(),
            sql: "select 1".to_string(),
            result: QueryResult::NoRows,
            message: Some("No data found for the selected query.".to_string()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["tier"], "standard");
        assert_eq!(json["result"]["kind"], "noRows");
        assert_eq!(json["message"], "No data found for the selected query.");
    }
}
