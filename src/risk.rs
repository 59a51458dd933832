// =============================================================================
// Position classification and per-session risk state
// =============================================================================
//
// `RiskState` is the one piece of session memory the engine carries between
// cycles: price extrema since tracking began and the profit/loss percentage
// with its high-water mark.  It is owned by the engine, fed explicitly every
// cycle from fresh external reads, and its reset transitions fire on exactly
// one path — an order actually executing.  A failed cycle never touches it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::exchange::Position;
use crate::market_data::{Candle, Ticker};

// ---------------------------------------------------------------------------
// Position classification
// ---------------------------------------------------------------------------

/// How the venue's position snapshot reads: long, short, or flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionClass {
    Flat,
    Long,
    Short,
}

impl std::fmt::Display for PositionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "no-position"),
            Self::Long => write!(f, "long-position"),
            Self::Short => write!(f, "short-position"),
        }
    }
}

/// Classify by the sign of the position amount.
pub fn classify(position: Option<&Position>) -> PositionClass {
    match position {
        Some(p) if p.amount > 0.0 => PositionClass::Long,
        Some(p) if p.amount < 0.0 => PositionClass::Short,
        _ => PositionClass::Flat,
    }
}

// ---------------------------------------------------------------------------
// RiskState
// ---------------------------------------------------------------------------

/// Running extrema and profit/loss tracking for one trading session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskState {
    pub last_price: f64,
    pub peak_price: f64,
    pub bottom_price: f64,
    pub pl_perc: f64,
    pub pl_high_perc: f64,
}

impl Default for RiskState {
    fn default() -> Self {
        Self {
            last_price: 0.0,
            peak_price: 0.0,
            bottom_price: f64::INFINITY,
            pl_perc: 0.0,
            pl_high_perc: 0.0,
        }
    }
}

impl RiskState {
    /// Fold one cycle's fresh reads into the session state: the last traded
    /// price, the current bar's range, and — when a position exists — the
    /// venue-reported profit/loss relative to the entry notional.
    pub fn observe(&mut self, ticker: &Ticker, current_bar: &Candle, position: Option<&Position>) {
        self.last_price = ticker.last_price;

        self.peak_price = self.peak_price.max(self.last_price).max(current_bar.high);
        self.bottom_price = self.bottom_price.min(self.last_price).min(current_bar.low);

        if let Some(position) = position {
            let initial = position.base * position.amount.abs();
            self.pl_perc = if initial == 0.0 {
                0.0
            } else {
                position.pl / initial
            };
            if self.pl_perc > self.pl_high_perc {
                self.pl_high_perc = self.pl_perc;
            }
        }

        debug!(
            last_price = self.last_price,
            peak_price = self.peak_price,
            bottom_price = self.bottom_price,
            pl_perc = self.pl_perc,
            pl_high_perc = self.pl_high_perc,
            "risk state observed"
        );
    }

    /// A fill went through: a new risk episode begins.  Extrema snap to the
    /// traded price and the high-water mark resets.
    pub fn on_order_executed(&mut self, fill_price: f64) {
        self.peak_price = fill_price;
        self.bottom_price = fill_price;
        self.pl_high_perc = 0.0;
    }
}
