//! Index quotes for the daily brief.
//!
//! A basket is fetched all-or-nothing: one symbol with fewer than two closes
//! fails the whole basket, and the caller substitutes a sentinel string.

mod provider;
mod yahoo;

pub use provider::{DailyClose, ProviderError, QuoteProvider};
pub use yahoo::YahooChartAdapter;

use chrono::NaiveDate;
use std::fmt;
use tracing::debug;

use brief_common::config::IndexEntry;

/// Sentinel embedded in the prompt when the domestic basket is unavailable.
pub const DOMESTIC_UNAVAILABLE: &str = "Domestic index data unavailable.";

/// Sentinel embedded in the prompt when the global basket is unavailable.
pub const GLOBAL_UNAVAILABLE: &str = "Global index data unavailable.";

/// Percentage change from `previous_close` to `close`.
pub fn percent_change(previous_close: f64, close: f64) -> f64 {
    (close - previous_close) / previous_close * 100.0
}

/// Round to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Change between the two most recent closes of one index.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSnapshot {
    pub symbol: String,
    /// Display name
    pub name: String,
    pub close: f64,
    pub previous_close: f64,
    pub point_change: f64,
    pub percent_change: f64,
    pub as_of_date: NaiveDate,
}

impl QuoteSnapshot {
    /// Build a snapshot from a close series (oldest first).
    pub fn from_closes(entry: &IndexEntry, closes: &[DailyClose]) -> Result<Self, ProviderError> {
        let [.., previous, latest] = closes else {
            return Err(ProviderError::InsufficientHistory {
                symbol: entry.symbol.clone(),
                points: closes.len(),
            });
        };

        if previous.close == 0.0 {
            return Err(ProviderError::InvalidData {
                symbol: entry.symbol.clone(),
                reason: "previous close is zero".into(),
            });
        }

        Ok(Self {
            symbol: entry.symbol.clone(),
            name: entry.name.clone(),
            close: latest.close,
            previous_close: previous.close,
            point_change: latest.close - previous.close,
            percent_change: percent_change(previous.close, latest.close),
            as_of_date: latest.date,
        })
    }
}

impl fmt::Display for QuoteSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} ({:+.2} pts, {:+.2}%) as of {}",
            self.name,
            self.close,
            round2(self.point_change),
            round2(self.percent_change),
            self.as_of_date.format("%d %b %Y")
        )
    }
}

/// Fetch every index in a basket; the first failure fails the basket.
pub async fn fetch_basket(
    provider: &dyn QuoteProvider,
    basket: &[IndexEntry],
) -> Result<Vec<QuoteSnapshot>, ProviderError> {
    let mut snapshots = Vec::with_capacity(basket.len());

    for entry in basket {
        let closes = provider.daily_closes(&entry.symbol).await?;
        let snapshot = QuoteSnapshot::from_closes(entry, &closes)?;
        debug!(
            provider = provider.name(),
            symbol = %snapshot.symbol,
            percent_change = snapshot.percent_change,
            "Quote snapshot computed"
        );
        snapshots.push(snapshot);
    }

    Ok(snapshots)
}

/// Largest absolute percentage move in a basket.
pub fn max_abs_change(snapshots: &[QuoteSnapshot]) -> Option<f64> {
    snapshots
        .iter()
        .map(|s| s.percent_change.abs())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

/// Prompt text for a basket, or the sentinel when it is unavailable.
pub fn describe_basket(snapshots: Option<&[QuoteSnapshot]>, sentinel: &str) -> String {
    match snapshots {
        Some(s) if !s.is_empty() => s
            .iter()
            .map(|snap| snap.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => sentinel.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    struct StaticProvider {
        series: HashMap<String, Vec<DailyClose>>,
    }

    impl StaticProvider {
        fn new(entries: Vec<(&str, Vec<f64>)>) -> Self {
            let series = entries
                .into_iter()
                .map(|(symbol, closes)| {
                    let closes = closes
                        .iter()
                        .enumerate()
                        .map(|(i, c)| DailyClose::new(day(10 + i as u32), *c))
                        .collect();
                    (symbol.to_string(), closes)
                })
                .collect();
            Self { series }
        }
    }

    #[async_trait]
    impl QuoteProvider for StaticProvider {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn daily_closes(&self, symbol: &str) -> Result<Vec<DailyClose>, ProviderError> {
            self.series
                .get(symbol)
                .cloned()
                .ok_or_else(|| ProviderError::Status(404))
        }
    }

    fn basket() -> Vec<IndexEntry> {
        vec![
            IndexEntry::new("^NSEI", "NIFTY 50"),
            IndexEntry::new("^BSESN", "SENSEX"),
        ]
    }

    #[test]
    fn test_percent_change_sign_and_rounding() {
        assert_eq!(round2(percent_change(100.0, 99.0)), -1.0);
        assert_eq!(round2(percent_change(200.0, 201.0)), 0.5);
        assert_eq!(round2(percent_change(3.0, 4.0)), 33.33);
        assert_eq!(round2(percent_change(3.0, 2.0)), -33.33);
    }

    #[test]
    fn test_snapshot_uses_last_two_closes() {
        let entry = IndexEntry::new("^NSEI", "NIFTY 50");
        let closes = [
            DailyClose::new(day(13), 90.0),
            DailyClose::new(day(14), 100.0),
            DailyClose::new(day(15), 99.0),
        ];
        let snap = QuoteSnapshot::from_closes(&entry, &closes).unwrap();
        assert_eq!(snap.previous_close, 100.0);
        assert_eq!(snap.close, 99.0);
        assert_eq!(snap.point_change, -1.0);
        assert_eq!(round2(snap.percent_change), -1.0);
        assert_eq!(snap.as_of_date, day(15));
        assert_eq!(snap.to_string(), "NIFTY 50: 99.00 (-1.00 pts, -1.00%) as of 15 Oct 2026");
    }

    #[test]
    fn test_snapshot_requires_two_points() {
        let entry = IndexEntry::new("^NSEI", "NIFTY 50");
        let err = QuoteSnapshot::from_closes(&entry, &[DailyClose::new(day(15), 99.0)]).unwrap_err();
        assert!(matches!(err, ProviderError::InsufficientHistory { points: 1, .. }));
    }

    #[test]
    fn test_snapshot_rejects_zero_previous_close() {
        let entry = IndexEntry::new("X", "X");
        let closes = [DailyClose::new(day(14), 0.0), DailyClose::new(day(15), 1.0)];
        assert!(matches!(
            QuoteSnapshot::from_closes(&entry, &closes),
            Err(ProviderError::InvalidData { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_basket_success() {
        let provider = StaticProvider::new(vec![
            ("^NSEI", vec![100.0, 99.0]),
            ("^BSESN", vec![200.0, 201.0]),
        ]);
        let snapshots = fetch_basket(&provider, &basket()).await.unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(max_abs_change(&snapshots).map(round2), Some(1.0));
    }

    #[tokio::test]
    async fn test_fetch_basket_is_all_or_nothing() {
        let provider = StaticProvider::new(vec![("^NSEI", vec![100.0, 99.0]), ("^BSESN", vec![201.0])]);
        let err = fetch_basket(&provider, &basket()).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::InsufficientHistory { ref symbol, points: 1 } if symbol == "^BSESN"
        ));
    }

    #[test]
    fn test_describe_basket() {
        assert_eq!(describe_basket(None, GLOBAL_UNAVAILABLE), GLOBAL_UNAVAILABLE);
        assert_eq!(describe_basket(Some(&[]), GLOBAL_UNAVAILABLE), GLOBAL_UNAVAILABLE);
    }

    #[test]
    fn test_max_abs_change_empty() {
        assert_eq!(max_abs_change(&[]), None);
    }
}
