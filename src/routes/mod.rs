use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::AppState;

pub mod analyze;
pub mod health;
pub mod metrics;

/// Build the API router. Mobile clients call the analyze endpoint from a
/// webview-style HTTP stack, so preflights must be answered permissively.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/analyze", post(analyze::analyze_photo))
        .with_state(state)
        .layer(cors)
}
