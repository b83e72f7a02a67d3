//! Repertoire API server entry point.

use std::sync::Arc;

use repertoire_api::config::AppConfig;
use repertoire_api::error::AppError;
use repertoire_api::pipeline::{Collaborators, Pipeline, PipelineSettings};
use repertoire_api::routes;
use repertoire_api::state::AppState;
use repertoire_api::telemetry::Telemetry;
use repertoire_bus::BusConfig;
use repertoire_catalog_store::PgCatalogRepository;
use repertoire_core::clock::{Clock, SystemClock};
use repertoire_core::storage::DirectoryLayout;
use repertoire_realtime::broker::HttpBroker;
use repertoire_realtime::token::HmacTokenIssuer;
use repertoire_search::meilisearch::{MeilisearchClient, MeilisearchConfig};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let telemetry = Telemetry::init(
        std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|endpoint| !endpoint.is_empty())
            .as_deref(),
    )?;

    tracing::info!("Starting Repertoire API server");

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    let catalog = Arc::new(PgCatalogRepository::new(pool));

    let http = reqwest::Client::new();
    let engine = Arc::new(MeilisearchClient::new(
        http.clone(),
        MeilisearchConfig {
            url: config.search_url.clone(),
            api_key: config.search_api_key.clone(),
            index: config.search_index.clone(),
        },
    ));
    let settings_task = engine.ensure_index_settings().await?;
    tracing::info!(%settings_task, "index settings update enqueued");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let deps = Collaborators {
        artists: catalog.clone(),
        albums: catalog.clone(),
        songs: catalog,
        engine: engine.clone(),
        broker: Arc::new(HttpBroker::new(http, config.realtime_url.clone())),
        issuer: Arc::new(HmacTokenIssuer::new(
            config.realtime_token_secret.as_bytes(),
            "repertoire-api",
            config.realtime_token_ttl,
            clock,
        )),
        paths: Arc::new(DirectoryLayout::new(config.storage_root.clone())),
    };
    let settings = PipelineSettings {
        bus: BusConfig {
            workers_per_queue: config.bus_workers,
            max_deliveries: config.bus_max_deliveries,
            ..BusConfig::default()
        },
        task_ttl: config.task_ttl,
        token_cache_ttl: config.token_cache_ttl(),
        ..PipelineSettings::default()
    };
    let pipeline = Pipeline::start(deps, settings)?;

    let app_state = AppState::new(
        engine,
        pipeline.webhook.clone(),
        config.webhook_secret.as_str(),
    );

    // TODO: Replace CorsLayer::permissive() with the web client's origin once it is configurable.
    let app = routes::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    pipeline.shutdown().await;
    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
