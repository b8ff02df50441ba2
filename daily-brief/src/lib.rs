//! Daily Brief Library
//!
//! Assembles a daily equity-market brief: index moves, institutional fund
//! flows and recent headlines are embedded in an analyst prompt, which is sent
//! to a text-generation service. The returned narrative is printed under a
//! fixed banner.
//!
//! # Pipeline
//!
//! ```text
//!  Quote Fetcher ──┐
//!  (domestic,      │
//!   global)        │
//!  Flow Retriever ─┼──► Brief Composer ──► Narrative Generator ──► Presenter
//!  News Aggregator ┘
//! ```
//!
//! The four upstream fetches are independent and run concurrently. Each one
//! that fails is replaced by a sentinel sentence in the prompt; only a
//! generation failure aborts the run.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod composer;
pub mod flow;
pub mod generator;
pub mod market;
pub mod news;
pub mod presenter;
pub mod volatility;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use brief_common::config::{Config, IndexEntry};

use crate::composer::{compose_prompt, BriefInputs};
use crate::flow::{FlowOutcome, FlowRetriever};
use crate::generator::{build_generator, GenerationRequest, NarrativeGenerator};
use crate::market::{
    describe_basket, fetch_basket, QuoteProvider, QuoteSnapshot,
    YahooChartAdapter, DOMESTIC_UNAVAILABLE, GLOBAL_UNAVAILABLE,
};
use crate::news::{describe_news, NewsAggregator, NewsItem};
use crate::volatility::VolatilityRegime;

/// Everything gathered from upstream sources for one run.
///
/// `None` means the whole category is unavailable.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub date: NaiveDate,
    pub domestic: Option<Vec<QuoteSnapshot>>,
    pub global: Option<Vec<QuoteSnapshot>>,
    pub regime: Option<VolatilityRegime>,
    pub flows: FlowOutcome,
    pub news: Option<Vec<NewsItem>>,
}

impl MarketData {
    /// Render every block and compose the prompt.
    pub fn to_prompt(&self) -> String {
        let domestic = describe_basket(self.domestic.as_deref(), DOMESTIC_UNAVAILABLE);
        let global = describe_basket(self.global.as_deref(), GLOBAL_UNAVAILABLE);
        let flows = self.flows.describe();
        let news = describe_news(self.news.as_deref());

        compose_prompt(&BriefInputs {
            date: self.date,
            domestic: &domestic,
            global: &global,
            regime: self.regime,
            flows: &flows,
            news: &news,
        })
    }
}

/// Output of a complete run.
#[derive(Debug, Clone)]
pub struct Brief {
    pub date: NaiveDate,
    pub prompt: String,
    pub narrative: String,
}

/// Threads configuration and data through the pipeline.
pub struct BriefService {
    config: Config,
    quotes: Arc<dyn QuoteProvider>,
    flows: FlowRetriever,
    news: NewsAggregator,
}

impl BriefService {
    pub fn new(config: Config) -> Self {
        let quotes = Arc::new(YahooChartAdapter::from_config(&config.markets));
        let flows = FlowRetriever::from_config(&config.flows);
        let news = NewsAggregator::from_config(&config.news);

        Self {
            config,
            quotes,
            flows,
            news,
        }
    }

    /// Replace the quote provider.
    pub fn with_quote_provider(mut self, provider: Arc<dyn QuoteProvider>) -> Self {
        self.quotes = provider;
        self
    }

    /// Replace the flow tier chain.
    pub fn with_flow_retriever(mut self, retriever: FlowRetriever) -> Self {
        self.flows = retriever;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn basket(&self, label: &'static str, basket: &[IndexEntry]) -> Option<Vec<QuoteSnapshot>> {
        match fetch_basket(self.quotes.as_ref(), basket).await {
            Ok(snapshots) if !snapshots.is_empty() => Some(snapshots),
            Ok(_) => {
                warn!(basket = label, "Basket is empty, using sentinel");
                None
            }
            Err(e) => {
                warn!(basket = label, provider = self.quotes.name(), error = %e, "Basket unavailable, using sentinel");
                None
            }
        }
    }

    /// Fetch quotes, flows and news concurrently.
    pub async fn gather(&self, date: NaiveDate) -> MarketData {
        let (domestic, global, flows, news) = tokio::join!(
            self.basket("domestic", &self.config.markets.domestic),
            self.basket("global", &self.config.markets.global),
            self.flows.retrieve(date),
            self.news.collect(),
        );

        let news = match news {
            Ok(items) => Some(items),
            Err(e) => {
                warn!(error = %e, "News aggregation failed, using sentinel");
                None
            }
        };

        let regime = domestic.as_deref().and_then(VolatilityRegime::for_basket);

        info!(
            date = %date,
            domestic = domestic.is_some(),
            global = global.is_some(),
            flows = flows.record().is_some(),
            news = news.as_ref().map_or(0, |n| n.len()),
            regime = regime.map_or("n/a", |r| r.label()),
            "Upstream data gathered"
        );

        MarketData {
            date,
            domestic,
            global,
            regime,
            flows,
            news,
        }
    }

    /// Gather data and compose the prompt without generating.
    pub async fn compose(&self, date: NaiveDate) -> String {
        self.gather(date).await.to_prompt()
    }

    /// Full run with the configured generation backend.
    pub async fn run(&self, date: NaiveDate) -> Result<Brief> {
        let generator = build_generator(&self.config).context("Narrative generator unavailable")?;
        self.run_with(generator.as_ref(), date).await
    }

    /// Full run with an explicit generator.
    pub async fn run_with(&self, generator: &dyn NarrativeGenerator, date: NaiveDate) -> Result<Brief> {
        let prompt = self.compose(date).await;
        let request = GenerationRequest::new(&self.config.generator, prompt.clone());

        let narrative = generator
            .generate(&request)
            .await
            .with_context(|| format!("Narrative generation via {} failed", generator.name()))?;

        Ok(Brief {
            date,
            prompt,
            narrative,
        })
    }
}
