use reqwest::Client;
use serde_json::Value;

use crate::config::AppConfig;
use crate::services::fixtures;

/// System instruction fixing the exact output schema and constraints.
const SYSTEM_PROMPT: &str = r#"You are a repair diagnostics assistant. Return ONLY valid JSON matching this schema:
{
  "issueTitle": string,
  "confidence": number 0-100,
  "difficulty": "Easy"|"Medium"|"Hard",
  "estimatedMinutes": number,
  "highLevelOverview": string[],
  "tools": [{"name":string,"quantity":number,"mustHave":boolean}],
  "parts": [{"name":string,"variants":string[],"notes":string}],
  "steps": [{"order":number,"title":string,"detail":string}],
  "safetyChecklist": string[],
  "commonMistakes": string[],
  "verifyBeforeBuy": string[]
}

Rules: Provide 8-12 steps. Keep language concise and practical."#;

/// Favor determinism over creativity.
const TEMPERATURE: f64 = 0.2;

/// Produces a raw (not yet normalized) diagnosis document.
///
/// With a configured API key the producer calls the vision model; without
/// one it serves a fixture keyed by the job id and performs no network I/O.
pub struct DiagnosisProducer {
    vision: Option<VisionClient>,
}

impl DiagnosisProducer {
    pub fn from_config(config: &AppConfig) -> Self {
        let vision = config.ai_api_key.as_ref().map(|api_key| VisionClient {
            http: Client::new(),
            api_url: config.ai_api_url.clone(),
            model: config.ai_model.clone(),
            api_key: api_key.clone(),
        });
        Self { vision }
    }

    /// True when requests will be served from fixtures.
    pub fn is_fixture_backed(&self) -> bool {
        self.vision.is_none()
    }

    pub async fn produce(
        &self,
        job_id: &str,
        image_url: &str,
        category: Option<&str>,
        note: Option<&str>,
    ) -> Result<Value, ProducerError> {
        match &self.vision {
            None => {
                tracing::debug!(job_id = %job_id, "no model API key configured, serving fixture");
                Ok(serde_json::to_value(fixtures::pick(job_id))
                    .unwrap_or_else(|_| Value::Object(Default::default())))
            }
            Some(vision) => vision.diagnose(image_url, category, note).await,
        }
    }
}

/// Client for an OpenAI-compatible chat-completions endpoint with vision
/// support. The photo is referenced by URL, never uploaded here.
struct VisionClient {
    http: Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl VisionClient {
    async fn diagnose(
        &self,
        image_url: &str,
        category: Option<&str>,
        note: Option<&str>,
    ) -> Result<Value, ProducerError> {
        let user_prompt = format!(
            "Category: {}\nNotes: {}\nAnalyze the image and produce the JSON.",
            category.unwrap_or("Unknown"),
            note.unwrap_or("None"),
        );

        let body = serde_json::json!({
            "model": self.model,
            "temperature": TEMPERATURE,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": user_prompt },
                        { "type": "image_url", "image_url": { "url": image_url } },
                    ],
                },
            ],
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProducerError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProducerError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = response.json().await.map_err(ProducerError::Http)?;
        let reply = extract_reply(&envelope).ok_or(ProducerError::EmptyReply)?;

        let json_text = extract_json(&reply)?;
        serde_json::from_str(json_text)
            .map_err(|e| ProducerError::Malformed(format!("reply is not valid JSON: {e}")))
    }
}

/// Pull the assistant's textual reply out of the provider envelope. Providers
/// differ: chat-completions style, flattened `output_text`, or a nested
/// responses-style output array.
fn extract_reply(envelope: &Value) -> Option<String> {
    envelope
        .pointer("/choices/0/message/content")
        .or_else(|| envelope.get("output_text"))
        .or_else(|| envelope.pointer("/output/0/content/0/text"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Locate the JSON object inside a reply that may be wrapped in prose: the
/// substring from the first `{` to the last `}`.
fn extract_json(text: &str) -> Result<&str, ProducerError> {
    let first = text.find('{');
    let last = text.rfind('}');
    match (first, last) {
        (Some(first), Some(last)) if last > first => Ok(&text[first..=last]),
        _ => Err(ProducerError::Malformed(
            "no JSON object found in model reply".to_string(),
        )),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    #[error("vision model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vision model returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("vision model reply was empty")]
    EmptyReply,

    #[error("malformed model output: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_json_wrapped_in_prose() {
        let reply = r#"Sure! Here is the JSON: {"issueTitle":"A","confidence":50} Thanks!"#;
        let json_text = extract_json(reply).unwrap();
        assert_eq!(json_text, r#"{"issueTitle":"A","confidence":50}"#);
        let parsed: Value = serde_json::from_str(json_text).unwrap();
        assert_eq!(parsed["issueTitle"], "A");
    }

    #[test]
    fn bare_json_passes_through() {
        assert_eq!(extract_json(r#"{"a":1}"#).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn reply_without_braces_is_malformed() {
        assert!(matches!(
            extract_json("I could not analyze the image."),
            Err(ProducerError::Malformed(_))
        ));
    }

    #[test]
    fn reversed_braces_are_malformed() {
        assert!(matches!(
            extract_json("} nothing here {"),
            Err(ProducerError::Malformed(_))
        ));
    }

    #[test]
    fn reads_chat_completions_envelope() {
        let envelope = json!({
            "choices": [{"message": {"content": "{\"issueTitle\":\"X\"}"}}]
        });
        assert_eq!(
            extract_reply(&envelope).unwrap(),
            "{\"issueTitle\":\"X\"}"
        );
    }

    #[test]
    fn falls_back_to_output_text_and_output_array() {
        let flat = json!({"output_text": "{\"a\":1}"});
        assert_eq!(extract_reply(&flat).unwrap(), "{\"a\":1}");

        let nested = json!({"output": [{"content": [{"text": "{\"b\":2}"}]}]});
        assert_eq!(extract_reply(&nested).unwrap(), "{\"b\":2}");
    }

    #[test]
    fn empty_reply_is_none() {
        assert!(extract_reply(&json!({})).is_none());
        assert!(extract_reply(&json!({"choices": [{"message": {"content": "  "}}]})).is_none());
    }

    #[tokio::test]
    async fn fixture_path_needs_no_network() {
        let config: crate::config::AppConfig =
            envy::from_iter(std::iter::empty::<(String, String)>()).unwrap();
        let producer = DiagnosisProducer::from_config(&config);
        assert!(producer.is_fixture_backed());

        let raw = producer
            .produce("job-1", "https://x/img.jpg", Some("door"), None)
            .await
            .unwrap();
        assert!(raw.get("issueTitle").is_some());
    }
}
