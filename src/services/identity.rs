use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

/// Identity resolved from a bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

/// Exchanges a bearer credential for a verified user identity.
///
/// A pure gate: no retries (a bad token is not transient) and no side
/// effects beyond the provider call.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, bearer_token: &str) -> Result<AuthenticatedUser, IdentityError>;
}

/// Client for the Supabase GoTrue identity endpoint.
pub struct SupabaseIdentity {
    http: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct UserEnvelope {
    id: Uuid,
}

impl SupabaseIdentity {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for SupabaseIdentity {
    async fn verify(&self, bearer_token: &str) -> Result<AuthenticatedUser, IdentityError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(IdentityError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
            });
        }

        let user: UserEnvelope = response.json().await.map_err(IdentityError::Http)?;
        Ok(AuthenticatedUser { id: user.id })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider rejected credential (status {status})")]
    Rejected { status: u16 },
}
