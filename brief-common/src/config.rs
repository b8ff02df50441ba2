//! Configuration types and loading for the daily brief.
//!
//! Configuration is read from `~/.daily-brief/config.json` when present and
//! falls back to built-in defaults otherwise. Credentials normally arrive via
//! environment variables (see [`Config::apply_env_overrides`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result, ResultExt};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".daily-brief"),
        |dirs| dirs.home_dir().join(".daily-brief"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Markets
// ============================================================================

/// A single index in a basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Ticker symbol as understood by the quote source (e.g. "^NSEI")
    pub symbol: String,
    /// Display name used in the prompt (e.g. "NIFTY 50")
    pub name: String,
}

impl IndexEntry {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Quote source and basket configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketsConfig {
    /// Chart endpoint; the symbol is appended as a path segment
    #[serde(default = "default_quote_endpoint")]
    pub quote_endpoint: String,

    /// History window requested per symbol
    #[serde(default = "default_history_range")]
    pub history_range: String,

    /// Request timeout in seconds
    #[serde(default = "default_quote_timeout")]
    pub timeout_secs: u64,

    /// Domestic basket (drives the volatility regime)
    #[serde(default = "default_domestic_basket")]
    pub domestic: Vec<IndexEntry>,

    /// Global basket
    #[serde(default = "default_global_basket")]
    pub global: Vec<IndexEntry>,
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            quote_endpoint: default_quote_endpoint(),
            history_range: default_history_range(),
            timeout_secs: default_quote_timeout(),
            domestic: default_domestic_basket(),
            global: default_global_basket(),
        }
    }
}

// ============================================================================
// Institutional Flows
// ============================================================================

/// Institutional flow source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowsConfig {
    /// Dated CSV archive; `{date}` is replaced with the run date
    #[serde(default = "default_archive_url_template")]
    pub archive_url_template: String,

    /// chrono format applied to the run date for the archive URL
    #[serde(default = "default_archive_date_format")]
    pub archive_date_format: String,

    /// Archive request timeout in seconds
    #[serde(default = "default_archive_timeout")]
    pub archive_timeout_secs: u64,

    /// Statistics page scraped when the archive has nothing usable
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,

    /// Fallback request timeout in seconds
    #[serde(default = "default_fallback_timeout")]
    pub fallback_timeout_secs: u64,

    /// User agent sent to the fallback page
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self {
            archive_url_template: default_archive_url_template(),
            archive_date_format: default_archive_date_format(),
            archive_timeout_secs: default_archive_timeout(),
            fallback_url: default_fallback_url(),
            fallback_timeout_secs: default_fallback_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

// ============================================================================
// News
// ============================================================================

/// News feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Syndication feeds, read in order
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,

    /// Entries taken from the head of each feed
    #[serde(default = "default_per_feed")]
    pub per_feed: usize,

    /// Character budget for each summary
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,

    /// Maximum headlines after de-duplication
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Request timeout in seconds
    #[serde(default = "default_news_timeout")]
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            per_feed: default_per_feed(),
            summary_chars: default_summary_chars(),
            max_items: default_max_items(),
            timeout_secs: default_news_timeout(),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Text-generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorBackend {
    /// OpenAI chat completions
    #[default]
    OpenAi,
    /// Hugging Face inference API
    HuggingFace,
}

impl FromStr for GeneratorBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            other => Err(Error::Config(format!("unknown generator backend '{}'", other))),
        }
    }
}

impl fmt::Display for GeneratorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::HuggingFace => write!(f, "huggingface"),
        }
    }
}

/// Narrative generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub backend: GeneratorBackend,

    /// Model id; empty means the backend default
    #[serde(default)]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_huggingface_base_url")]
    pub huggingface_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_generator_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: GeneratorBackend::default(),
            model: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            openai_base_url: default_openai_base_url(),
            huggingface_base_url: default_huggingface_base_url(),
            timeout_secs: default_generator_timeout(),
        }
    }
}

impl GeneratorConfig {
    /// Model to request, resolving the backend default.
    pub fn model_or_default(&self) -> &str {
        if !self.model.is_empty() {
            return &self.model;
        }
        match self.backend {
            GeneratorBackend::OpenAi => "gpt-4o-mini",
            GeneratorBackend::HuggingFace => "mistralai/Mistral-7B-Instruct-v0.3",
        }
    }
}

/// Credentials, one per generation backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huggingface_api_key: Option<String>,
}

impl SecretsConfig {
    /// Credential for the given backend, ignoring blank values.
    pub fn key_for(&self, backend: GeneratorBackend) -> Option<&str> {
        let key = match backend {
            GeneratorBackend::OpenAi => self.openai_api_key.as_deref(),
            GeneratorBackend::HuggingFace => self.huggingface_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

// ============================================================================
// Observability
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub markets: MarketsConfig,

    #[serde(default)]
    pub flows: FlowsConfig,

    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .context(format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration (default path or `path`) with environment overrides.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.secrets.openai_api_key = Some(key);
        }
        if let Some(key) = lookup("HF_API_TOKEN").or_else(|| lookup("HUGGINGFACE_API_KEY")) {
            self.secrets.huggingface_api_key = Some(key);
        }
        if let Some(level) = lookup("BRIEF_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("BRIEF_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(backend) = lookup("BRIEF_GENERATOR_BACKEND") {
            self.generator.backend = backend.parse()?;
        }
        Ok(())
    }
}

// ============================================================================
// Defaults
// ============================================================================

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "pretty".into()
}
fn default_quote_endpoint() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".into()
}
fn default_history_range() -> String {
    "5d".into()
}
fn default_quote_timeout() -> u64 {
    15
}
fn default_domestic_basket() -> Vec<IndexEntry> {
    vec![
        IndexEntry::new("^NSEI", "NIFTY 50"),
        IndexEntry::new("^NSEBANK", "BANK NIFTY"),
        IndexEntry::new("^BSESN", "SENSEX"),
    ]
}
fn default_global_basket() -> Vec<IndexEntry> {
    vec![
        IndexEntry::new("^GSPC", "S&P 500"),
        IndexEntry::new("^IXIC", "NASDAQ Composite"),
        IndexEntry::new("^DJI", "Dow Jones"),
        IndexEntry::new("^N225", "Nikkei 225"),
        IndexEntry::new("^HSI", "Hang Seng"),
        IndexEntry::new("^FTSE", "FTSE 100"),
    ]
}
fn default_archive_url_template() -> String {
    "https://archives.nseindia.com/content/fo/fii_dii_{date}.csv".into()
}
fn default_archive_date_format() -> String {
    "%d%m%Y".into()
}
fn default_archive_timeout() -> u64 {
    10
}
fn default_fallback_url() -> String {
    "https://www.moneycontrol.com/stocks/marketstats/fii_dii_activity/index.php".into()
}
fn default_fallback_timeout() -> u64 {
    15
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko)"
        .into()
}
fn default_feeds() -> Vec<String> {
    vec![
        "https://economictimes.indiatimes.com/markets/rssfeeds/1977021501.cms".into(),
        "https://www.moneycontrol.com/rss/marketreports.xml".into(),
        "https://www.livemint.com/rss/markets".into(),
    ]
}
fn default_per_feed() -> usize {
    4
}
fn default_summary_chars() -> usize {
    400
}
fn default_max_items() -> usize {
    6
}
fn default_news_timeout() -> u64 {
    15
}
fn default_temperature() -> f64 {
    0.2
}
fn default_max_tokens() -> u32 {
    900
}
fn default_openai_base_url() -> String {
    "https://api.openai.com".into()
}
fn default_huggingface_base_url() -> String {
    "https://api-inference.huggingface.co".into()
}
fn default_generator_timeout() -> u64 {
    120
}
