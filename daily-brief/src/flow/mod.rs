//! Institutional (FII/DII) fund flows.
//!
//! Flows come from an ordered chain of tiers. Each tier either yields a
//! complete [`FlowRecord`] or a [`FlowError`] meaning "try the next one";
//! results are never merged across tiers. When every tier fails the chain
//! yields [`FlowOutcome::Unavailable`].

mod archive;
mod scrape;

pub use archive::ArchiveCsvSource;
pub use scrape::StatsPageSource;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use brief_common::config::FlowsConfig;

/// Sentinel embedded in the prompt when no tier produced flow data.
pub const FLOW_UNAVAILABLE: &str = "FII/DII flow data could not be retrieved.";

// ============================================================================
// Types
// ============================================================================

/// Which tier produced a record, cited in the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSourceLabel {
    /// Dated CSV archive
    ArchiveData,
    /// Scraped statistics page
    FallbackSource,
}

impl FlowSourceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArchiveData => "Archive Data",
            Self::FallbackSource => "Fallback Source",
        }
    }
}

impl fmt::Display for FlowSourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Net institutional flows for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub flow_date: String,
    pub source: FlowSourceLabel,
    /// Foreign institutional net, verbatim from the source
    pub fii_net: String,
    /// Domestic institutional net, verbatim from the source
    pub dii_net: String,
}

/// Result of running the tier chain.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    Retrieved(FlowRecord),
    Unavailable,
}

impl FlowOutcome {
    pub fn record(&self) -> Option<&FlowRecord> {
        match self {
            Self::Retrieved(record) => Some(record),
            Self::Unavailable => None,
        }
    }

    /// Prompt text for this outcome.
    pub fn describe(&self) -> String {
        match self {
            Self::Retrieved(r) => format!(
                "Date: {}\nSource: {}\nFII net: {}\nDII net: {}",
                r.flow_date, r.source, r.fii_net, r.dii_net
            ),
            Self::Unavailable => FLOW_UNAVAILABLE.to_string(),
        }
    }
}

/// Reasons a tier gives up.
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("No matching row: {0}")]
    NoMatch(String),
    #[error("Failed to parse: {0}")]
    Parse(String),
}

// ============================================================================
// Flow Source Trait
// ============================================================================

/// One tier of the flow retrieval chain.
#[async_trait]
pub trait FlowSource: Send + Sync {
    /// Tier name for logging
    fn name(&self) -> &'static str;

    /// Fetch flows for the given session date.
    async fn fetch(&self, date: NaiveDate) -> Result<FlowRecord, FlowError>;
}

// ============================================================================
// Flow Retriever
// ============================================================================

/// Runs tiers in order until one succeeds.
pub struct FlowRetriever {
    tiers: Vec<Arc<dyn FlowSource>>,
}

impl FlowRetriever {
    /// Build a chain from explicit tiers, evaluated in the given order.
    pub fn new(tiers: Vec<Arc<dyn FlowSource>>) -> Self {
        Self { tiers }
    }

    /// Archive first, then the statistics page.
    pub fn from_config(config: &FlowsConfig) -> Self {
        Self::new(vec![
            Arc::new(ArchiveCsvSource::from_config(config)),
            Arc::new(StatsPageSource::from_config(config)),
        ])
    }

    /// Number of tiers in the chain.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Try each tier in order; the first success wins.
    pub async fn retrieve(&self, date: NaiveDate) -> FlowOutcome {
        for tier in &self.tiers {
            match tier.fetch(date).await {
                Ok(record) => {
                    info!(
                        tier = tier.name(),
                        source = %record.source,
                        flow_date = %record.flow_date,
                        "Institutional flows retrieved"
                    );
                    return FlowOutcome::Retrieved(record);
                }
                Err(e) => {
                    warn!(tier = tier.name(), error = %e, "Flow tier failed, trying next");
                }
            }
        }

        warn!(tiers = self.tiers.len(), "All flow tiers failed");
        FlowOutcome::Unavailable
    }
}

/// Collapse whitespace in a scraped or CSV cell.
fn clean_cell(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: FlowSourceLabel) -> FlowRecord {
        FlowRecord {
            flow_date: "16-Oct-2026".into(),
            source,
            fii_net: "-1,234.56".into(),
            dii_net: "2,345.67".into(),
        }
    }

    #[test]
    fn test_describe_retrieved() {
        let text = FlowOutcome::Retrieved(record(FlowSourceLabel::ArchiveData)).describe();
        assert!(text.contains("Source: Archive Data"));
        assert!(text.contains("FII net: -1,234.56"));
        assert!(text.contains("DII net: 2,345.67"));
    }

    #[test]
    fn test_describe_unavailable() {
        assert_eq!(FlowOutcome::Unavailable.describe(), FLOW_UNAVAILABLE);
        assert!(FlowOutcome::Unavailable.record().is_none());
    }

    #[test]
    fn test_labels() {
        assert_eq!(FlowSourceLabel::ArchiveData.to_string(), "Archive Data");
        assert_eq!(FlowSourceLabel::FallbackSource.to_string(), "Fallback Source");
    }

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell("  16-Oct-2026\n "), "16-Oct-2026");
        assert_eq!(clean_cell("Net \t Purchase"), "Net Purchase");
    }

    #[test]
    fn test_default_chain_order() {
        let retriever = FlowRetriever::from_config(&FlowsConfig::default());
        assert_eq!(retriever.len(), 2);
        assert_eq!(retriever.tiers[0].name(), "archive");
        assert_eq!(retriever.tiers[1].name(), "stats_page");
    }
}
