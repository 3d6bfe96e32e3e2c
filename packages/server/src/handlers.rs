//! HTTP handler functions for the `EnforceIQ` API.

use actix_web::{HttpResponse, web};
use enforceiq_analytics::predictor::DEFAULT_PREVIEW_LEN;
use enforceiq_analytics::summary::describe_prediction;
use enforceiq_analytics::{AnalyticsError, executor};
use enforceiq_analytics_models::PredictionQuery;
use enforceiq_catalog::CatalogError;
use enforceiq_catalog_models::QueryTier;
use enforceiq_database::stops::count_stops;
use enforceiq_server_models::{
    ApiError, ApiHealth, ApiPrediction, ApiQueryExecution, ApiQueryLabels, ExecuteQueryRequest,
    QueryLookupParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let stored_stops = match state.db.as_deref() {
        Some(db) => match count_stops(db).await {
            Ok(count) => Some(count),
            Err(e) => {
                log::warn!("Failed to count stops: {e}");
                None
            }
        },
        None => None,
    };

    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        database_connected: state.db.is_some(),
        loaded_stops: state.dataset.len(),
        stored_stops,
    })
}

/// `GET /api/metrics`
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.dataset.key_metrics())
}

/// `GET /api/demographics`
pub async fn demographics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.dataset.demographic_breakdown())
}

/// `GET /api/durations`
///
/// Duration buckets offered by the prediction form.
pub async fn durations(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.dataset.duration_options())
}

/// `GET /api/queries`
pub async fn query_labels(state: web::Data<AppState>) -> HttpResponse {
    let labels = |tier| -> Vec<String> {
        state
            .catalog
            .labels(tier)
            .into_iter()
            .map(ToString::to_string)
            .collect()
    };

    HttpResponse::Ok().json(ApiQueryLabels {
        standard: labels(QueryTier::Standard),
        advanced: labels(QueryTier::Advanced),
    })
}

/// `GET /api/queries/{tier}`
pub async fn tier_labels(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Ok(tier) = path.parse::<QueryTier>() else {
        return unknown_tier(&path);
    };

    HttpResponse::Ok().json(state.catalog.labels(tier))
}

/// `GET /api/query?tier=&label=`
///
/// Returns the definition, including its SQL, without running it.
pub async fn query_definition(
    state: web::Data<AppState>,
    params: web::Query<QueryLookupParams>,
) -> HttpResponse {
    let Ok(tier) = params.tier.parse::<QueryTier>() else {
        return unknown_tier(&params.tier);
    };

    match state.catalog.get(tier, &params.label) {
        Ok(definition) => HttpResponse::Ok().json(definition),
        Err(e) => catalog_error(&e),
    }
}

/// `POST /api/query/execute`
///
/// Runs a catalog query. Database failures come back as `noRows` with a
/// message rather than an error status.
pub async fn execute_query(
    state: web::Data<AppState>,
    body: web::Json<ExecuteQueryRequest>,
) -> HttpResponse {
    let report = executor::execute_label(
        state.db.as_deref(),
        &state.catalog,
        body.tier,
        &body.label,
        state.query_timeout,
    )
    .await;

    match report {
        Ok(report) => HttpResponse::Ok().json(ApiQueryExecution {
            tier: report.definition.tier(),
            label: report.definition.label().to_string(),
            sql: report.definition.sql().to_string(),
            result: report.result,
            message: report.message,
        }),
        Err(AnalyticsError::Catalog(e)) => catalog_error(&e),
        Err(e) => {
            log::error!("Failed to execute query '{}': {e}", body.label);
            HttpResponse::InternalServerError().json(ApiError::new("Failed to execute query"))
        }
    }
}

/// `POST /api/predict`
pub async fn predict(
    state: web::Data<AppState>,
    body: web::Json<PredictionQuery>,
) -> HttpResponse {
    let query = body.into_inner();
    let cohort = state.dataset.cohort(&query);
    let prediction = cohort.prediction();

    if prediction.is_fallback() {
        log::debug!("Prediction fell back for {query:?}");
    }

    HttpResponse::Ok().json(ApiPrediction {
        fallback: prediction.is_fallback(),
        summary: describe_prediction(&query, &prediction),
        preview: cohort
            .preview(DEFAULT_PREVIEW_LEN)
            .iter()
            .map(|record| (*record).clone())
            .collect(),
        prediction,
    })
}

fn unknown_tier(tier: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError::new(format!(
        "Unknown query tier '{tier}', expected 'standard' or 'advanced'"
    )))
}

fn catalog_error(e: &CatalogError) -> HttpResponse {
    match e {
        CatalogError::UnknownQuery { .. } => {
            HttpResponse::NotFound().json(ApiError::new(e.to_string()))
        }
        _ => {
            log::error!("Catalog error: {e}");
            HttpResponse::InternalServerError().json(ApiError::new(e.to_string()))
        }
    }
}
