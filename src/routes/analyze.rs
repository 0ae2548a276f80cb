use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Instant;

use crate::app_state::{AppState, Backend};
use crate::models::diagnosis::DiagnosisResult;
use crate::models::job::JobStatus;
use crate::services::normalize::normalize;
use crate::services::producer::{DiagnosisProducer, ProducerError};
use crate::services::quota::{self, QuotaDecision};
use crate::services::store::StoreError;

/// Inbound analysis request. Presence of the required fields is checked by
/// hand so the response body matches the documented contract.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// POST /api/v1/analyze — authenticate, reserve a quota slot, produce a
/// diagnosis, normalize and persist it, keeping the job status current.
pub async fn analyze_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    counter!("analyze_requests_total").increment(1);

    let result = handle(&state, &headers, &body).await;
    histogram!("analyze_duration_seconds").record(started.elapsed().as_secs_f64());

    match result {
        Ok(diagnosis) => (StatusCode::OK, Json(diagnosis)).into_response(),
        Err(err) => {
            counter!("analyze_failures_total", "kind" => err.kind()).increment(1);
            err.into_response()
        }
    }
}

async fn handle(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<DiagnosisResult, AnalyzeError> {
    let backend = state.backend.as_ref().ok_or(AnalyzeError::ConfigMissing)?;

    let token = bearer_token(headers).ok_or(AnalyzeError::MissingAuth)?;
    let user = backend.identity.verify(token).await.map_err(|e| {
        tracing::warn!(error = %e, "token verification failed");
        AnalyzeError::InvalidToken
    })?;

    let request: AnalyzeRequest = serde_json::from_slice(body)?;
    let job_id = request.job_id.filter(|v| !v.is_empty());
    let image_url = request.image_url.filter(|v| !v.is_empty());
    let (job_id, image_url) = match (job_id, image_url) {
        (Some(job_id), Some(image_url)) => (job_id, image_url),
        _ => return Err(AnalyzeError::BadRequest),
    };

    // Quota gate. The slot is reserved before the diagnosis is produced, so
    // a failed model call still consumes it.
    let profile = backend.store.ensure_profile(user.id).await?;
    let today = Utc::now().date_naive();
    let next_count = match quota::evaluate(&profile, today) {
        QuotaDecision::Denied => {
            counter!("analyze_quota_rejections_total").increment(1);
            tracing::info!(user_id = %user.id, "daily limit reached");
            return Err(AnalyzeError::RateLimited);
        }
        QuotaDecision::Admitted { next_count } => next_count,
    };
    backend.store.record_usage(user.id, next_count, today).await?;

    // The job advances past `uploaded` from here on; any later failure must
    // leave the job marked `error` before it propagates.
    let outcome = run_diagnosis(
        backend,
        &state.producer,
        &job_id,
        &image_url,
        request.category.as_deref(),
        request.note.as_deref(),
    )
    .await;

    match outcome {
        Ok(diagnosis) => {
            tracing::info!(job_id = %job_id, user_id = %user.id, "analysis complete");
            Ok(diagnosis)
        }
        Err(err) => {
            if let Err(mark_err) = backend
                .store
                .set_job_status(&job_id, JobStatus::Error, Some(&err.to_string()))
                .await
            {
                tracing::warn!(job_id = %job_id, error = %mark_err, "failed to mark job as errored");
            }
            Err(err)
        }
    }
}

async fn run_diagnosis(
    backend: &Backend,
    producer: &DiagnosisProducer,
    job_id: &str,
    image_url: &str,
    category: Option<&str>,
    note: Option<&str>,
) -> Result<DiagnosisResult, AnalyzeError> {
    backend
        .store
        .set_job_status(job_id, JobStatus::Analyzing, None)
        .await?;

    let raw = producer.produce(job_id, image_url, category, note).await?;
    let diagnosis = normalize(&raw);

    backend.store.upsert_diagnosis(job_id, &diagnosis).await?;
    backend
        .store
        .set_job_status(job_id, JobStatus::Done, None)
        .await?;

    Ok(diagnosis)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Supabase environment missing")]
    ConfigMissing,

    #[error("Missing Authorization header")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing job_id or image_url")]
    BadRequest,

    #[error("invalid request body: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Daily limit reached")]
    RateLimited,

    #[error(transparent)]
    Producer(#[from] ProducerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AnalyzeError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::ConfigMissing | Self::Payload(_) | Self::Producer(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable label for the failure counter.
    fn kind(&self) -> &'static str {
        match self {
            Self::ConfigMissing => "config_missing",
            Self::MissingAuth => "missing_auth",
            Self::InvalidToken => "invalid_token",
            Self::BadRequest => "bad_request",
            Self::Payload(_) => "bad_payload",
            Self::RateLimited => "rate_limited",
            Self::Producer(ProducerError::Malformed(_)) => "malformed_model_output",
            Self::Producer(_) => "producer_unavailable",
            Self::Store(_) => "persistence_failure",
        }
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
