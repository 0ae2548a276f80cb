mod app_state;
mod config;
mod models;
mod routes;
mod services;

use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;

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

    tracing::info!("Initializing repair-advisor server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("analyze_requests_total", "Total analysis requests received");
    metrics::describe_counter!(
        "analyze_failures_total",
        "Analysis requests that ended in an error response, by kind"
    );
    metrics::describe_counter!(
        "analyze_quota_rejections_total",
        "Analysis requests rejected by the daily quota gate"
    );
    metrics::describe_histogram!(
        "analyze_duration_seconds",
        "Wall-clock time to serve an analysis request"
    );

    // Create shared application state
    let state = AppState::from_config(&config);

    if state.producer.is_fixture_backed() {
        tracing::info!("AI_API_KEY not set, diagnoses will be served from fixtures");
    } else {
        tracing::info!(model = %config.ai_model, "vision model configured");
    }

    // Build API routes
    let app = routes::router(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1 MB limit, photos travel by URL

    tracing::info!("Starting repair-advisor on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
