//! Brief Common - shared configuration, errors, and logging for the daily brief.
//!
//! This crate provides:
//! - Configuration types and loading (file + environment)
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    Config, FlowsConfig, GeneratorBackend, GeneratorConfig, IndexEntry, MarketsConfig,
    NewsConfig, ObservabilityConfig, SecretsConfig,
};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};
