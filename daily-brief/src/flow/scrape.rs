//! Fallback flow tier: a public FII/DII statistics page.
//!
//! Takes the first data row of the first table on the page. Column 0 is the
//! date, column 3 FII net, column 5 DII net.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::debug;

use brief_common::config::FlowsConfig;

use super::{clean_cell, FlowError, FlowRecord, FlowSource, FlowSourceLabel};

const DATE_COLUMN: usize = 0;
const FII_NET_COLUMN: usize = 3;
const DII_NET_COLUMN: usize = 5;

/// Scraped statistics page tier.
pub struct StatsPageSource {
    client: reqwest::Client,
    url: String,
}

impl StatsPageSource {
    /// The page blocks default clients, so a browser user agent is required.
    pub fn new(url: impl Into<String>, user_agent: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_config(config: &FlowsConfig) -> Self {
        Self::new(
            config.fallback_url.clone(),
            &config.user_agent,
            Duration::from_secs(config.fallback_timeout_secs),
        )
    }
}

fn selector(css: &str) -> Result<scraper::Selector, FlowError> {
    scraper::Selector::parse(css)
        .map_err(|e| FlowError::Parse(format!("invalid selector '{}': {:?}", css, e)))
}

/// Extract the first data row of the first table.
fn parse_stats_table(html: &str) -> Result<FlowRecord, FlowError> {
    let document = scraper::Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| FlowError::NoMatch("page has no table".into()))?;

    // Header rows use <th> only and are skipped.
    let cells: Vec<String> = table
        .select(&row_sel)
        .map(|row| {
            row.select(&cell_sel)
                .map(|cell| clean_cell(&cell.text().collect::<String>()))
                .collect::<Vec<_>>()
        })
        .find(|cells| !cells.is_empty())
        .ok_or_else(|| FlowError::NoMatch("table has no data rows".into()))?;

    if cells.len() <= DII_NET_COLUMN {
        return Err(FlowError::Parse(format!(
            "first row has {} cell(s), expected at least {}",
            cells.len(),
            DII_NET_COLUMN + 1
        )));
    }

    Ok(FlowRecord {
        flow_date: cells[DATE_COLUMN].clone(),
        source: FlowSourceLabel::FallbackSource,
        fii_net: cells[FII_NET_COLUMN].clone(),
        dii_net: cells[DII_NET_COLUMN].clone(),
    })
}

#[async_trait]
impl FlowSource for StatsPageSource {
    fn name(&self) -> &'static str {
        "stats_page"
    }

    async fn fetch(&self, _date: NaiveDate) -> Result<FlowRecord, FlowError> {
        debug!(url = %self.url, "Fetching flow statistics page");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FlowError::Status(response.status().as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        parse_stats_table(&html)
    }
}
