use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Supabase project URL. Optional so a misconfigured deployment still
    /// boots and answers every analysis request with a 500 instead of
    /// refusing to start.
    pub supabase_url: Option<String>,

    /// Supabase API key used for identity verification and row-store calls.
    pub supabase_anon_key: Option<String>,

    /// Vision model API key. When absent the producer serves built-in
    /// fixture diagnoses and performs no network I/O.
    pub ai_api_key: Option<String>,

    /// Vision model name.
    #[serde(default = "default_ai_model")]
    pub ai_model: String,

    /// Chat-completions endpoint of the model provider.
    #[serde(default = "default_ai_api_url")]
    pub ai_api_url: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied_when_env_empty() {
        let config: AppConfig =
            envy::from_iter(std::iter::empty::<(String, String)>()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.ai_model, "gpt-4o-mini");
        assert_eq!(config.ai_api_url, "https://api.openai.com/v1/chat/completions");
        assert!(config.supabase_url.is_none());
        assert!(config.ai_api_key.is_none());
    }

    #[test]
    fn reads_supabase_settings() {
        let vars = vec![
            ("SUPABASE_URL".to_string(), "https://proj.supabase.co".to_string()),
            ("SUPABASE_ANON_KEY".to_string(), "anon-key".to_string()),
            ("AI_MODEL".to_string(), "gpt-4o".to_string()),
        ];
        let config: AppConfig = envy::from_iter(vars).unwrap();
        assert_eq!(config.supabase_url.as_deref(), Some("https://proj.supabase.co"));
        assert_eq!(config.supabase_anon_key.as_deref(), Some("anon-key"));
        assert_eq!(config.ai_model, "gpt-4o");
    }
}
