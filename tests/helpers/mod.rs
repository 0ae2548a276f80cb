//! Test doubles for E2E testing: an in-memory row store and a stub identity
//! provider wired into the real router.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use axum::Router;
use repair_advisor::app_state::{AppState, Backend};
use repair_advisor::config::AppConfig;
use repair_advisor::models::diagnosis::DiagnosisResult;
use repair_advisor::models::job::JobStatus;
use repair_advisor::models::profile::Profile;
use repair_advisor::routes;
use repair_advisor::services::identity::{AuthenticatedUser, IdentityError, IdentityVerifier};
use repair_advisor::services::producer::DiagnosisProducer;
use repair_advisor::services::store::{RowStore, StoreError};

pub const TEST_TOKEN: &str = "test-session-token";

/// In-memory `RowStore` with a write counter and injectable failures.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_diagnosis_writes: AtomicBool,
}

#[derive(Default)]
struct Inner {
    profiles: HashMap<Uuid, Profile>,
    jobs: HashMap<String, (JobStatus, Option<String>)>,
    diagnoses: HashMap<String, DiagnosisResult>,
    writes: usize,
}

impl MemoryStore {
    pub fn seed_profile(&self, profile: Profile) {
        let mut inner = self.inner.lock().unwrap();
        inner.profiles.insert(profile.id, profile);
    }

    /// Make every diagnosis upsert fail, simulating a persistence outage.
    pub fn fail_diagnosis_writes(&self) {
        self.fail_diagnosis_writes.store(true, Ordering::SeqCst);
    }

    pub fn profile(&self, user_id: Uuid) -> Option<Profile> {
        self.inner.lock().unwrap().profiles.get(&user_id).cloned()
    }

    pub fn job_status(&self, job_id: &str) -> Option<JobStatus> {
        self.inner
            .lock()
            .unwrap()
            .jobs
            .get(job_id)
            .map(|(status, _)| *status)
    }

    pub fn job_error(&self, job_id: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .jobs
            .get(job_id)
            .and_then(|(_, message)| message.clone())
    }

    pub fn diagnosis(&self, job_id: &str) -> Option<DiagnosisResult> {
        self.inner.lock().unwrap().diagnoses.get(job_id).cloned()
    }

    pub fn diagnosis_count(&self) -> usize {
        self.inner.lock().unwrap().diagnoses.len()
    }

    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().writes
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn ensure_profile(&self, user_id: Uuid) -> Result<Profile, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        Ok(inner
            .profiles
            .entry(user_id)
            .or_insert_with(|| Profile::new(user_id))
            .clone())
    }

    async fn record_usage(
        &self,
        user_id: Uuid,
        daily_count: i32,
        daily_count_date: NaiveDate,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        let profile = inner
            .profiles
            .entry(user_id)
            .or_insert_with(|| Profile::new(user_id));
        profile.daily_count = daily_count;
        profile.daily_count_date = Some(daily_count_date);
        Ok(())
    }

    async fn set_job_status(
        &self,
        job_id: &str,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        inner
            .jobs
            .insert(job_id.to_string(), (status, error_message.map(String::from)));
        Ok(())
    }

    async fn upsert_diagnosis(
        &self,
        job_id: &str,
        result: &DiagnosisResult,
    ) -> Result<(), StoreError> {
        if self.fail_diagnosis_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Upstream {
                status: 503,
                body: "injected diagnosis write failure".to_string(),
            });
        }
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        inner.diagnoses.insert(job_id.to_string(), result.clone());
        Ok(())
    }
}

/// Identity verifier accepting a single known token.
pub struct StubIdentity {
    pub user_id: Uuid,
}

#[async_trait]
impl IdentityVerifier for StubIdentity {
    async fn verify(&self, bearer_token: &str) -> Result<AuthenticatedUser, IdentityError> {
        if bearer_token == TEST_TOKEN {
            Ok(AuthenticatedUser { id: self.user_id })
        } else {
            Err(IdentityError::Rejected { status: 401 })
        }
    }
}

/// Configuration with no Supabase environment and no model API key, so the
/// producer is fixture-backed.
pub fn fixture_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        supabase_url: None,
        supabase_anon_key: None,
        ai_api_key: None,
        ai_model: "gpt-4o-mini".to_string(),
        ai_api_url: "https://api.openai.com/v1/chat/completions".to_string(),
    }
}

/// Router wired with the in-memory backend and fixture producer.
pub fn test_app(store: Arc<MemoryStore>, user_id: Uuid) -> Router {
    let backend = Backend {
        identity: Arc::new(StubIdentity { user_id }),
        store,
    };
    let state = AppState::new(
        Some(backend),
        DiagnosisProducer::from_config(&fixture_config()),
    );
    routes::router(state)
}

/// Router with no backend configured at all.
pub fn unconfigured_app() -> Router {
    let state = AppState::new(None, DiagnosisProducer::from_config(&fixture_config()));
    routes::router(state)
}
