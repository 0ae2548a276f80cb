use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store: ComponentHealth,
    pub producer: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: String,
}

/// GET /health — configuration-level health: whether the Supabase backend is
/// wired and which diagnosis path (model or fixture) is active.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_configured = state.backend.is_some();

    let store = ComponentHealth {
        status: if store_configured {
            "ok".to_string()
        } else {
            "unconfigured".to_string()
        },
    };
    let producer = ComponentHealth {
        status: if state.producer.is_fixture_backed() {
            "fixture".to_string()
        } else {
            "model".to_string()
        },
    };

    let status_code = if store_configured {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if store_configured {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { store, producer },
    };

    (status_code, Json(response))
}
