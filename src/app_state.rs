use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::identity::{IdentityVerifier, SupabaseIdentity};
use crate::services::producer::DiagnosisProducer;
use crate::services::store::{RowStore, SupabaseStore};

/// Identity provider and row store, present only when the Supabase
/// environment is configured. Its absence is surfaced per request as a 500
/// rather than refusing to boot.
#[derive(Clone)]
pub struct Backend {
    pub identity: Arc<dyn IdentityVerifier>,
    pub store: Arc<dyn RowStore>,
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Option<Backend>,
    pub producer: Arc<DiagnosisProducer>,
}

impl AppState {
    pub fn new(backend: Option<Backend>, producer: DiagnosisProducer) -> Self {
        Self {
            backend,
            producer: Arc::new(producer),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let backend = match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => Some(Backend {
                identity: Arc::new(SupabaseIdentity::new(url, key)),
                store: Arc::new(SupabaseStore::new(url, key)),
            }),
            _ => {
                tracing::warn!(
                    "SUPABASE_URL/SUPABASE_ANON_KEY not configured, analysis requests will fail"
                );
                None
            }
        };

        Self::new(backend, DiagnosisProducer::from_config(config))
    }
}
