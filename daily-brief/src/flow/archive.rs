//! Primary flow tier: the dated CSV archive.
//!
//! The archive is keyed by session date. The first row whose first cell
//! contains `Net` carries FII net in column 1 and DII net in column 2.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::debug;

use brief_common::config::FlowsConfig;

use super::{clean_cell, FlowError, FlowRecord, FlowSource, FlowSourceLabel};

/// Marker identifying the net row.
const NET_MARKER: &str = "Net";

/// Dated CSV archive tier.
pub struct ArchiveCsvSource {
    client: reqwest::Client,
    url_template: String,
    date_format: String,
}

impl ArchiveCsvSource {
    pub fn new(
        url_template: impl Into<String>,
        date_format: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url_template: url_template.into(),
            date_format: date_format.into(),
        }
    }

    pub fn from_config(config: &FlowsConfig) -> Self {
        Self::new(
            config.archive_url_template.clone(),
            config.archive_date_format.clone(),
            Duration::from_secs(config.archive_timeout_secs),
        )
    }

    /// Archive URL for a session date.
    pub fn url_for(&self, date: NaiveDate) -> String {
        self.url_template
            .replace("{date}", &date.format(&self.date_format).to_string())
    }
}

/// Find the net row in an archive body. The first record is the header.
fn parse_archive_csv(body: &str, date: NaiveDate) -> Result<FlowRecord, FlowError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut rows = 0usize;
    for result in reader.records() {
        let record = result.map_err(|e| FlowError::Parse(e.to_string()))?;
        rows += 1;

        if !record.get(0).is_some_and(|first| first.contains(NET_MARKER)) {
            continue;
        }

        let (Some(fii), Some(dii)) = (record.get(1), record.get(2)) else {
            return Err(FlowError::Parse(format!(
                "net row has {} cell(s), expected at least 3",
                record.len()
            )));
        };

        return Ok(FlowRecord {
            flow_date: date.format("%d-%b-%Y").to_string(),
            source: FlowSourceLabel::ArchiveData,
            fii_net: clean_cell(fii),
            dii_net: clean_cell(dii),
        });
    }

    if rows == 0 {
        return Err(FlowError::Parse("archive has no data rows".into()));
    }
    Err(FlowError::NoMatch(format!("no row whose first cell contains '{}'", NET_MARKER)))
}

#[async_trait]
impl FlowSource for ArchiveCsvSource {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn fetch(&self, date: NaiveDate) -> Result<FlowRecord, FlowError> {
        let url = self.url_for(date);
        debug!(url = %url, "Fetching flow archive");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        // Only a plain 200 is usable; 204 and 206 are not.
        if response.status() != reqwest::StatusCode::OK {
            return Err(FlowError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        parse_archive_csv(&body, date)
    }
}
