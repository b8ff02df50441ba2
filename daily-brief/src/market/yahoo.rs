//! Yahoo chart adapter for index quotes.
//!
//! Queries the public v8 chart endpoint for a short daily history and keeps
//! only the close series.
//!
//! Response shape:
//! `{"chart": {"result": [{"meta": {...}, "timestamp": [...],
//!   "indicators": {"quote": [{"close": [...]}]}}], "error": null}}`

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use brief_common::config::MarketsConfig;

use super::provider::{DailyClose, ProviderError, QuoteProvider};

/// Yahoo chart API adapter.
pub struct YahooChartAdapter {
    /// HTTP client
    client: reqwest::Client,
    /// Chart endpoint (symbol appended as a path segment)
    endpoint: String,
    /// History window, e.g. "5d"
    range: String,
}

impl YahooChartAdapter {
    /// Create a new adapter against the given chart endpoint.
    pub fn new(endpoint: impl Into<String>, range: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: endpoint.into(),
            range: range.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &MarketsConfig) -> Self {
        Self::new(
            config.quote_endpoint.clone(),
            config.history_range.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Chart URL with the ticker as one escaped path segment (`^NSEI` -> `%5ENSEI`).
    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(symbol)
        )
    }
}

/// Convert a chart payload into closes, oldest first.
fn parse_chart(symbol: &str, response: ChartResponse) -> Result<Vec<DailyClose>, ProviderError> {
    if let Some(err) = response.chart.error {
        return Err(ProviderError::InvalidRequest(format!(
            "{}: {}",
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| ProviderError::Parse(format!("no chart result for {}", symbol)))?;

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut series = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close else {
            continue;
        };
        if !close.is_finite() {
            continue;
        }
        let date = local_date(*ts, offset).ok_or_else(|| {
            ProviderError::Parse(format!("invalid timestamp {} for {}", ts, symbol))
        })?;
        series.push(DailyClose::new(date, close));
    }

    series.sort_by_key(|c| c.date);
    Ok(series)
}

/// Exchange-local trading date for a unix timestamp.
fn local_date(ts: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts + gmtoffset, 0).map(|dt| dt.date_naive())
}

#[async_trait]
impl QuoteProvider for YahooChartAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn daily_closes(&self, symbol: &str) -> Result<Vec<DailyClose>, ProviderError> {
        let url = self.chart_url(symbol);
        debug!(url = %url, symbol, "Fetching daily closes");

        let response = self
            .client
            .get(&url)
            .query(&[("range", self.range.as_str()), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let data: ChartResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parse_chart(symbol, data)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
