//! Headline aggregation from syndication feeds.
//!
//! Feeds are read in configured order. Each contributes its first few items;
//! the combined list is deduplicated by exact title (first seen wins) and
//! capped. A failure on any feed fails the whole aggregation.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use brief_common::config::NewsConfig;

/// Sentinel embedded in the prompt when headlines are unavailable.
pub const NEWS_UNAVAILABLE: &str = "News data unavailable.";

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// One headline with its cleaned summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }
}

/// Feed retrieval errors.
#[derive(Debug, Clone, Error)]
pub enum NewsError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Invalid feed at {url}: {message}")]
    Feed { url: String, message: String },
}

/// Remove markup tags and collapse whitespace.
pub fn strip_markup(raw: &str) -> String {
    TAG_PATTERN
        .replace_all(raw, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Drop repeated titles, keeping the first occurrence in order.
pub fn dedupe_by_title(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.title.clone()))
        .collect()
}

/// Dedupe then cap.
pub fn finalize(items: Vec<NewsItem>, max_items: usize) -> Vec<NewsItem> {
    let mut items = dedupe_by_title(items);
    items.truncate(max_items);
    items
}

/// Turn a parsed channel into at most `per_feed` items.
fn items_from_channel(
    channel: &rss::Channel,
    per_feed: usize,
    summary_chars: usize,
) -> Vec<NewsItem> {
    channel
        .items()
        .iter()
        .take(per_feed)
        .filter_map(|item| {
            let title = item.title()?.trim();
            if title.is_empty() {
                return None;
            }
            let summary = item
                .description()
                .or_else(|| item.content())
                .map(|s| truncate_chars(&strip_markup(s), summary_chars))
                .unwrap_or_default();
            Some(NewsItem::new(title, summary))
        })
        .collect()
}

/// Prompt text for the headline list, or the sentinel.
pub fn describe_news(items: Option<&[NewsItem]>) -> String {
    match items {
        Some(items) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if item.summary.is_empty() {
                    format!("{}. {}", i + 1, item.title)
                } else {
                    format!("{}. {}\n   Summary: {}", i + 1, item.title, item.summary)
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => NEWS_UNAVAILABLE.to_string(),
    }
}

/// Reads the configured feeds.
pub struct NewsAggregator {
    client: reqwest::Client,
    feeds: Vec<String>,
    per_feed: usize,
    summary_chars: usize,
    max_items: usize,
}

impl NewsAggregator {
    pub fn from_config(config: &NewsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("daily-brief/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            feeds: config.feeds.clone(),
            per_feed: config.per_feed,
            summary_chars: config.summary_chars,
            max_items: config.max_items,
        }
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<NewsItem>, NewsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NewsError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(NewsError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content = response.bytes().await.map_err(|e| NewsError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let channel = rss::Channel::read_from(&content[..]).map_err(|e| NewsError::Feed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let items = items_from_channel(&channel, self.per_feed, self.summary_chars);
        debug!(url = %url, items = items.len(), "Feed parsed");
        Ok(items)
    }

    /// Collect, dedupe and cap headlines across every feed.
    pub async fn collect(&self) -> Result<Vec<NewsItem>, NewsError> {
        let mut collected = Vec::new();
        for url in &self.feeds {
            collected.extend(self.fetch_feed(url).await?);
        }

        let raw = collected.len();
        let items = finalize(collected, self.max_items);
        info!(feeds = self.feeds.len(), raw, kept = items.len(), "Headlines aggregated");
        Ok(items)
    }
}
