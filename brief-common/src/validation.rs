//! Configuration validation.
//!
//! Catches settings that would make a run meaningless before any network
//! call is made.

use thiserror::Error;

use crate::config::{Config, FlowsConfig, GeneratorConfig, MarketsConfig, NewsConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

impl Validate for MarketsConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.domestic.is_empty() {
            return Err(invalid("markets.domestic", "basket must contain at least one index"));
        }
        if let Some(entry) = self
            .domestic
            .iter()
            .chain(self.global.iter())
            .find(|e| e.symbol.trim().is_empty())
        {
            return Err(invalid("markets", format!("index '{}' has an empty symbol", entry.name)));
        }
        Ok(())
    }
}

impl Validate for FlowsConfig {
    fn validate(&self) -> ValidationResult<()> {
        if !self.archive_url_template.contains("{date}") {
            return Err(invalid(
                "flows.archive_url_template",
                "template must contain a {date} placeholder",
            ));
        }
        if self.archive_timeout_secs == 0 {
            return Err(invalid("flows.archive_timeout_secs", "must be greater than 0"));
        }
        Ok(())
    }
}

impl Validate for NewsConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.per_feed == 0 {
            return Err(invalid("news.per_feed", "must be greater than 0"));
        }
        if self.max_items == 0 {
            return Err(invalid("news.max_items", "must be greater than 0"));
        }
        if self.summary_chars == 0 {
            return Err(invalid("news.summary_chars", "must be greater than 0"));
        }
        Ok(())
    }
}

impl Validate for GeneratorConfig {
    fn validate(&self) -> ValidationResult<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid(
                "generator.temperature",
                format!("{} is outside 0.0..=2.0", self.temperature),
            ));
        }
        if self.max_tokens == 0 {
            return Err(invalid("generator.max_tokens", "must be greater than 0"));
        }
        Ok(())
    }
}

impl Config {
    /// Validate the entire configuration.
    ///
    /// `require_credentials` is false when no generation call will be made
    /// (prompt-only runs).
    pub fn validate(&self, require_credentials: bool) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.markets.validate() {
            errors.push(e);
        }
        if let Err(e) = self.flows.validate() {
            errors.push(e);
        }
        if let Err(e) = self.news.validate() {
            errors.push(e);
        }
        if let Err(e) = self.generator.validate() {
            errors.push(e);
        }

        if require_credentials && self.secrets.key_for(self.generator.backend).is_none() {
            errors.push(ValidationError::MissingField {
                field: format!("secrets.{}_api_key", self.generator.backend),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorBackend;

    fn config_with_key() -> Config {
        let mut config = Config::default();
        config.secrets.openai_api_key = Some("sk-test".into());
        config
    }

    #[test]
    fn test_default_config_with_key_is_valid() {
        assert!(config_with_key().validate(true).is_ok());
    }

    #[test]
    fn test_missing_credential() {
        let config = Config::default();
        let err = config.validate(true).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { ref field } if field == "secrets.openai_api_key"));
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn test_credential_follows_backend() {
        let mut config = config_with_key();
        config.generator.backend = GeneratorBackend::HuggingFace;
        let err = config.validate(true).unwrap_err();
        assert!(err.to_string().contains("huggingface_api_key"));
    }

    #[test]
    fn test_invalid_values_are_collected() {
        let mut config = config_with_key();
        config.markets.domestic.clear();
        config.news.max_items = 0;
        config.generator.temperature = 3.5;

        match config.validate(true).unwrap_err() {
            ValidationError::Multiple(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn test_archive_template_needs_placeholder() {
        let mut config = config_with_key();
        config.flows.archive_url_template = "https://example.com/flows.csv".into();
        let err = config.validate(true).unwrap_err();
        assert!(err.to_string().contains("flows.archive_url_template"));
    }
}
