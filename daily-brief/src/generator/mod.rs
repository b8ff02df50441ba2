//! Narrative generation.
//!
//! One backend is selected per run. Each holds a fixed request and response
//! contract; any failure here fails the run since there is no fallback
//! narrative.

mod huggingface;
mod openai;

pub use huggingface::HuggingFaceGenerator;
pub use openai::OpenAiGenerator;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use brief_common::config::{Config, GeneratorBackend, GeneratorConfig};

use crate::composer::SYSTEM_ROLE;

/// Generation failures.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("No API key configured for the {0} backend")]
    MissingCredential(GeneratorBackend),
    #[error("Request to {backend} failed: {message}")]
    Network { backend: &'static str, message: String },
    #[error("{backend} returned HTTP {status}: {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },
    #[error("{0} returned an empty narrative")]
    EmptyResponse(&'static str),
    #[error("Failed to parse {backend} response: {message}")]
    Parse { backend: &'static str, message: String },
}

/// One generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Request with the fixed decoding parameters from configuration.
    pub fn new(config: &GeneratorConfig, prompt: impl Into<String>) -> Self {
        Self {
            system: SYSTEM_ROLE.to_string(),
            prompt: prompt.into(),
            model: config.model_or_default().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// A text-generation service.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Produce the narrative for a composed prompt.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Build the configured backend.
pub fn build_generator(config: &Config) -> Result<Box<dyn NarrativeGenerator>, GenerationError> {
    let backend = config.generator.backend;
    let api_key = config
        .secrets
        .key_for(backend)
        .ok_or(GenerationError::MissingCredential(backend))?;
    let timeout = Duration::from_secs(config.generator.timeout_secs);

    let generator: Box<dyn NarrativeGenerator> = match backend {
        GeneratorBackend::OpenAi => Box::new(OpenAiGenerator::new(
            api_key,
            &config.generator.openai_base_url,
            timeout,
        )),
        GeneratorBackend::HuggingFace => Box::new(HuggingFaceGenerator::new(
            api_key,
            &config.generator.huggingface_base_url,
            timeout,
        )),
    };

    Ok(generator)
}

/// Trimmed narrative, or `EmptyResponse` if nothing is left.
fn non_empty(backend: &'static str, text: &str) -> Result<String, GenerationError> {
    let text = text.trim();
    if text.is_empty() {
        Err(GenerationError::EmptyResponse(backend))
    } else {
        Ok(text.to_string())
    }
}

/// Bearer authorization header value.
fn bearer(api_key: &str) -> reqwest::header::HeaderValue {
    reqwest::header::HeaderValue::from_str(&format!("Bearer {}", api_key))
        .unwrap_or_else(|_| reqwest::header::HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_fixed_decoding() {
        let config = GeneratorConfig::default();
        let request = GenerationRequest::new(&config, "prompt");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, config.max_tokens);
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.system, SYSTEM_ROLE);
    }

    #[test]
    fn test_build_requires_credential() {
        let config = Config::default();
        let err = build_generator(&config).err().unwrap();
        assert!(matches!(err, GenerationError::MissingCredential(GeneratorBackend::OpenAi)));
        assert!(err.to_string().contains("openai"));
    }

    #[test]
    fn test_build_selects_backend() {
        let mut config = Config::default();
        config.secrets.huggingface_api_key = Some("hf_test".into());
        config.generator.backend = GeneratorBackend::HuggingFace;
        let generator = build_generator(&config).unwrap();
        assert_eq!(generator.name(), "huggingface");

        config.generator.backend = GeneratorBackend::OpenAi;
        config.secrets.openai_api_key = Some("sk-test".into());
        assert_eq!(build_generator(&config).unwrap().name(), "openai");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("openai", "  text \n").unwrap(), "text");
        assert!(matches!(non_empty("openai", " \n"), Err(GenerationError::EmptyResponse(_))));
    }
}
