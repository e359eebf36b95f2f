mod app_state;
mod config;
mod models;
mod routes;
mod services;

use std::sync::Arc;

use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::processor::HttpImageProcessor;
use services::store_catalog::StoreCatalog;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing store-visit-processor server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("visit_jobs_submitted_total", "Total visit jobs submitted");
    metrics::describe_counter!(
        "visit_jobs_completed_total",
        "Total visit jobs that reached completed"
    );
    metrics::describe_counter!("visit_jobs_failed_total", "Total visit jobs that failed");
    metrics::describe_counter!(
        "visit_images_processed_total",
        "Total images processed successfully"
    );
    metrics::describe_counter!(
        "visit_images_failed_total",
        "Total images that failed processing"
    );
    metrics::describe_histogram!(
        "visit_image_processing_seconds",
        "Time to fetch and measure a single image"
    );

    // Load the store master data
    tracing::info!(path = %config.store_master_file, "Loading store master data");
    let catalog = StoreCatalog::load_from_file(&config.store_master_file)
        .expect("Failed to load store master data");
    tracing::info!(stores = catalog.len(), "Store catalog loaded");

    // Create shared application state
    let state = AppState::new(catalog, Arc::new(HttpImageProcessor::new()));

    // Build API routes
    let app = routes::router(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1 MB limit

    tracing::info!("Starting store-visit-processor on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
