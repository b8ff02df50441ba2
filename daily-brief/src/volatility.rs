//! Volatility regime classification.
//!
//! Maps the largest absolute percentage move in the domestic basket to one of
//! three labels using fixed breakpoints.

use std::fmt;

use crate::market::{max_abs_change, round2, QuoteSnapshot};

/// Moves below this are `Low`.
pub const LOW_BREAKPOINT: f64 = 0.50;

/// Moves below this (and at least `LOW_BREAKPOINT`) are `Moderate`.
pub const MODERATE_BREAKPOINT: f64 = 1.00;

/// Volatility regime for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityRegime {
    Low,
    Moderate,
    Elevated,
}

impl VolatilityRegime {
    /// Classify the maximum absolute percentage change.
    ///
    /// The sign is ignored, so callers may pass a raw change as well.
    pub fn classify(max_abs_change: f64) -> Self {
        let magnitude = max_abs_change.abs();
        if magnitude < LOW_BREAKPOINT {
            Self::Low
        } else if magnitude < MODERATE_BREAKPOINT {
            Self::Moderate
        } else {
            Self::Elevated
        }
    }

    /// Regime for a basket, judged on the two-decimal move the prompt shows.
    pub fn for_basket(snapshots: &[QuoteSnapshot]) -> Option<Self> {
        max_abs_change(snapshots).map(|m| Self::classify(round2(m)))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::Elevated => "Elevated",
        }
    }
}

impl fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
