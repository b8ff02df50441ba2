//! OpenAI chat completions backend.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

use super::{bearer, non_empty, GenerationError, GenerationRequest, NarrativeGenerator};

const BACKEND: &str = "openai";

/// Chat completions client.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiGenerator {
    /// Create with a base URL (official API or a compatible endpoint).
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, bearer(api_key));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for OpenAiGenerator {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let start = Instant::now();
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = OpenAiRequest {
            model: request.model.clone(),
            messages: vec![
                OpenAiMessage {
                    role: "system".into(),
                    content: request.system.clone(),
                },
                OpenAiMessage {
                    role: "user".into(),
                    content: request.prompt.clone(),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network {
                backend: BACKEND,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                backend: BACKEND,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OpenAiResponse = response.json().await.map_err(|e| GenerationError::Parse {
            backend: BACKEND,
            message: e.to_string(),
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        info!(
            backend = BACKEND,
            model = %request.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "Narrative generated"
        );

        non_empty(BACKEND, &content)
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = OpenAiRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![
                OpenAiMessage {
                    role: "system".into(),
                    content: "Be factual".into(),
                },
                OpenAiMessage {
                    role: "user".into(),
                    content: "Brief".into(),
                },
            ],
            max_tokens: 900,
            temperature: 0.2,
        };

        let json: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Brief");
        assert_eq!(json["max_tokens"], 900);
        assert_eq!(json["temperature"], 0.2);
    }

    #[test]
    fn test_response_content_field() {
        let raw = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Markets fell."},"finish_reason":"stop"}]}"#;
        let parsed: OpenAiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Markets fell."));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let generator = OpenAiGenerator::new("sk", "http://localhost:8080/", Duration::from_secs(1));
        assert_eq!(generator.base_url, "http://localhost:8080");
    }
}
