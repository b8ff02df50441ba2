//! Quote provider abstraction.
//!
//! Defines the `QuoteProvider` trait that index-quote sources implement so
//! basket fetching can be tested without the network.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

// ============================================================================
// Provider Error
// ============================================================================

/// Errors specific to quote providers.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),
    /// Upstream answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),
    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Response could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),
    /// Fewer than two closes available for a symbol
    #[error("Insufficient history for {symbol}: {points} close(s)")]
    InsufficientHistory { symbol: String, points: usize },
    /// Values that cannot produce a change (e.g. zero previous close)
    #[error("Invalid data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },
}

// ============================================================================
// Data Types
// ============================================================================

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyClose {
    /// Trading date in the exchange's local time
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

impl DailyClose {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

// ============================================================================
// Quote Provider Trait
// ============================================================================

/// Trait for daily index quote sources.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider name (e.g., "yahoo")
    fn name(&self) -> &'static str;

    /// Fetch the recent daily closes for a symbol, oldest first.
    ///
    /// Entries without a close are dropped by the provider.
    async fn daily_closes(&self, symbol: &str) -> Result<Vec<DailyClose>, ProviderError>;
}
