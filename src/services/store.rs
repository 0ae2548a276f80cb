use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use crate::models::diagnosis::{DiagnosisResult, PartItem, RepairStep, ToolItem};
use crate::models::job::JobStatus;
use crate::models::profile::Profile;

/// Row-store operations used by the analysis handler.
///
/// All writes are idempotent upserts/updates keyed by id; there are no
/// transactions. The profile read-then-write sequence is therefore not
/// atomic across concurrent requests from the same user (see DESIGN.md).
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Upsert a profile row with defaults for `user_id` and return it.
    async fn ensure_profile(&self, user_id: Uuid) -> Result<Profile, StoreError>;

    /// Write back the reserved quota slot.
    async fn record_usage(
        &self,
        user_id: Uuid,
        daily_count: i32,
        daily_count_date: NaiveDate,
    ) -> Result<(), StoreError>;

    /// Update the job's status tag, attaching an error description on the
    /// error path.
    async fn set_job_status(
        &self,
        job_id: &str,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Upsert the diagnosis row keyed by job id (replace-on-conflict).
    async fn upsert_diagnosis(
        &self,
        job_id: &str,
        result: &DiagnosisResult,
    ) -> Result<(), StoreError>;
}

/// Supabase PostgREST client for the profile/job/diagnosis tables.
pub struct SupabaseStore {
    http: Client,
    base_url: String,
    anon_key: String,
}

/// Persisted diagnosis shape (snake_case columns, `job_id` key).
#[derive(Serialize)]
struct DiagnosisRow<'a> {
    job_id: &'a str,
    issue_title: &'a str,
    confidence: i32,
    difficulty: String,
    estimated_minutes: i32,
    high_level_overview: &'a [String],
    tools: &'a [ToolItem],
    parts: &'a [PartItem],
    steps: &'a [RepairStep],
    safety_checklist: &'a [String],
    common_mistakes: &'a [String],
    verify_before_buy: &'a [String],
}

impl SupabaseStore {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Surface non-2xx PostgREST responses with the upstream body attached.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RowStore for SupabaseStore {
    async fn ensure_profile(&self, user_id: Uuid) -> Result<Profile, StoreError> {
        // Upsert only the key column so an existing row's counters survive.
        let response = self
            .authed(self.http.post(self.rest_url("profiles")))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", "id")])
            .json(&serde_json::json!([{ "id": user_id }]))
            .send()
            .await?;
        Self::check(response).await?;

        let response = self
            .authed(self.http.get(self.rest_url("profiles")))
            .header("Accept", "application/vnd.pgrst.object+json")
            .query(&[
                ("id", format!("eq.{user_id}")),
                ("select", "id,is_pro,daily_count,daily_count_date".to_string()),
            ])
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn record_usage(
        &self,
        user_id: Uuid,
        daily_count: i32,
        daily_count_date: NaiveDate,
    ) -> Result<(), StoreError> {
        let response = self
            .authed(self.http.patch(self.rest_url("profiles")))
            .header("Prefer", "return=minimal")
            .query(&[("id", format!("eq.{user_id}"))])
            .json(&serde_json::json!({
                "daily_count": daily_count,
                "daily_count_date": daily_count_date,
            }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn set_job_status(
        &self,
        job_id: &str,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut patch = serde_json::json!({ "status": status });
        if let Some(message) = error_message {
            patch["error_message"] = serde_json::Value::from(message);
        }

        let response = self
            .authed(self.http.patch(self.rest_url("repair_jobs")))
            .header("Prefer", "return=minimal")
            .query(&[("id", format!("eq.{job_id}"))])
            .json(&patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn upsert_diagnosis(
        &self,
        job_id: &str,
        result: &DiagnosisResult,
    ) -> Result<(), StoreError> {
        let row = DiagnosisRow {
            job_id,
            issue_title: &result.issue_title,
            confidence: result.confidence,
            difficulty: result.difficulty.to_string(),
            estimated_minutes: result.estimated_minutes,
            high_level_overview: &result.high_level_overview,
            tools: &result.tools,
            parts: &result.parts,
            steps: &result.steps,
            safety_checklist: &result.safety_checklist,
            common_mistakes: &result.common_mistakes,
            verify_before_buy: &result.verify_before_buy,
        };

        let response = self
            .authed(self.http.post(self.rest_url("diagnosis_results")))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", "job_id")])
            .json(&serde_json::json!([row]))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("row store rejected request (status {status}): {body}")]
    Upstream { status: u16, body: String },
}
