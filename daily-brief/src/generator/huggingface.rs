//! Hugging Face inference API backend.
//!
//! Text-generation models take a single `inputs` string, so the role
//! description is prepended to the prompt.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

use super::{bearer, non_empty, GenerationError, GenerationRequest, NarrativeGenerator};

const BACKEND: &str = "huggingface";

pub struct HuggingFaceGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl HuggingFaceGenerator {
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

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }
}

#[async_trait]
impl NarrativeGenerator for HuggingFaceGenerator {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let start = Instant::now();

        let body = HfRequest {
            inputs: format!("{}\n\n{}", request.system, request.prompt),
            parameters: HfParameters {
                temperature: request.temperature,
                max_new_tokens: request.max_tokens,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(self.model_url(&request.model))
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

        let parsed: Vec<HfGeneration> =
            response.json().await.map_err(|e| GenerationError::Parse {
                backend: BACKEND,
                message: e.to_string(),
            })?;

        let text = parsed
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .unwrap_or_default();

        info!(
            backend = BACKEND,
            model = %request.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "Narrative generated"
        );

        non_empty(BACKEND, &text)
    }
}

#[derive(Debug, Serialize)]
struct HfRequest {
    inputs: String,
    parameters: HfParameters,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    temperature: f64,
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct HfGeneration {
    #[serde(default)]
    generated_text: String,
}
