#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for `EnforceIQ` traffic stop analytics.
//!
//! Serves the query catalog, runs catalog queries against the database,
//! and answers predictions and summary metrics from the normalized stop
//! log loaded once at startup. A failed database connection does not stop
//! the server: queries then return no rows and the dataset is empty.

mod handlers;
pub mod interactive;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use enforceiq_analytics::dataset::StopDataset;
use enforceiq_catalog::QueryCatalog;
use enforceiq_database::db::{self, DatabaseConfig};
use switchy_database::Database;

/// Shared application state.
///
/// Everything here is built before the server starts and only read
/// afterward.
pub struct AppState {
    /// Database connection for catalog queries. `None` if the connection
    /// failed at startup.
    pub db: Option<Arc<dyn Database>>,
    /// The query catalog.
    pub catalog: Arc<QueryCatalog>,
    /// Normalized stop log for predictions and metrics.
    pub dataset: Arc<StopDataset>,
    /// Upper bound on a single catalog query.
    pub query_timeout: Duration,
}

impl AppState {
    /// Connects, loads, and normalizes according to the environment.
    ///
    /// Connection and load failures are logged and leave the state without
    /// a database and with an empty dataset. An unreadable catalog policy
    /// falls back to the default policy.
    #[allow(clippy::future_not_send)]
    pub async fn from_env() -> Self {
        let catalog = QueryCatalog::from_env().unwrap_or_else(|e| {
            log::error!("{e}; using the default catalog policy");
            QueryCatalog::default()
        });

        let config = DatabaseConfig::from_env();

        log::info!("Connecting to database...");
        let db: Option<Arc<dyn Database>> = match db::connect(&config).await {
            Ok(conn) => Some(Arc::from(conn)),
            Err(e) => {
                log::warn!("Database unavailable, continuing without it: {e}");
                None
            }
        };

        log::info!("Loading traffic stops...");
        let dataset = StopDataset::load_or_empty(db.as_deref()).await;

        Self {
            db,
            catalog: Arc::new(catalog),
            dataset: Arc::new(dataset),
            query_timeout: config.query_timeout,
        }
    }
}

/// Default `BIND_ADDR`.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default `PORT`.
pub const DEFAULT_PORT: u16 = 8080;

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT`, falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("BIND_ADDR").ok().as_deref(),
            std::env::var("PORT").ok().as_deref(),
        )
    }

    fn from_values(bind_addr: Option<&str>, port: Option<&str>) -> Self {
        let port = port.map_or(DEFAULT_PORT, |raw| {
            raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT={raw:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            })
        });

        Self {
            bind_addr: bind_addr
                .map(str::trim)
                .filter(|addr| !addr.is_empty())
                .unwrap_or(DEFAULT_BIND_ADDR)
                .to_string(),
            port,
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/metrics", web::get().to(handlers::metrics))
            .route("/demographics", web::get().to(handlers::demographics))
            .route("/durations", web::get().to(handlers::durations))
            .route("/queries", web::get().to(handlers::query_labels))
            .route("/queries/{tier}", web::get().to(handlers::tier_labels))
            .route("/query", web::get().to(handlers::query_definition))
            .route("/query/execute", web::post().to(handlers::execute_query))
            .route("/predict", web::post().to(handlers::predict)),
    );
}

/// Starts the `EnforceIQ` API server.
///
/// Builds the [`AppState`] from the environment and serves the API on
/// `BIND_ADDR:PORT` (see [`ServerConfig`]). This is a regular async
/// function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_env().await);

    let ServerConfig { bind_addr, port } = ServerConfig::from_env();

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
