//! Error types shared by the brief crates.

use thiserror::Error;

/// Result type alias using the brief error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for configuration and process-level failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input or request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External service error
    #[error("External service error: {0}")]
    External(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error originates from configuration.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) | Self::Validation(_) => true,
            Self::WithContext { source, .. } => source.is_config(),
            _ => false,
        }
    }

    /// Process exit code for this error.
    ///
    /// Configuration problems exit with 78 (EX_CONFIG), everything else with 1.
    pub fn exit_code(&self) -> i32 {
        if self.is_config() {
            78
        } else {
            1
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::Config("missing key".into()).exit_code(), 78);
        assert_eq!(Error::External("HTTP 500".into()).exit_code(), 1);
        assert_eq!(Error::Internal("bug".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::Config("bad value".into());
        let with_ctx = err.with_context("loading config.json");
        assert!(matches!(with_ctx, Error::WithContext { .. }));
        assert!(with_ctx.is_config());
        assert!(with_ctx.to_string().starts_with("loading config.json"));
    }

    #[test]
    fn test_result_ext_context() {
        let io: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.context("reading config").unwrap_err();
        assert!(err.to_string().contains("reading config"));
        assert_eq!(err.exit_code(), 1);
    }
}
