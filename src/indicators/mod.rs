// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators consumed by the
// strategies.  Every indicator follows the same contract:
//
//   calculate(&series, response_size, source) -> Result<IndicatorResult>
//
// An indicator computes full-length internal lanes over the series (or the
// one-shorter difference axis for change-based indicators), knows the first
// index at which its final channel is numerically meaningful, and refuses —
// with `InsufficientHistory` — any request that would reach into the
// pre-warm-up region.  Served output is always the `response_size` most
// recent samples, newest last, every channel the same length and implicitly
// timestamped by the `mts` axis.
//
// Seeding discipline, shared by every smoothed lane: the first smoothed value
// is the plain arithmetic mean of the first `period` raw samples, never an
// exponential bootstrap from index 0.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod kox;
pub mod kvo;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod tsi;

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

// ---------------------------------------------------------------------------
// Indicator trait and closed kind set
// ---------------------------------------------------------------------------

/// One pure indicator computation.  Implementations hold window parameters
/// only — no state survives between `calculate` calls.
pub trait Indicator: Send + Sync {
    fn calculate(
        &self,
        series: &CandleSeries,
        response_size: usize,
        source: Source,
    ) -> Result<IndicatorResult>;
}

/// The closed set of indicator kinds the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Bollinger,
    Macd,
    Kvo,
    Tsi,
    Adx,
    Rsi,
    Kox,
}

impl IndicatorKind {
    /// Build the indicator with its reference default parameters.
    pub fn build(self) -> Box<dyn Indicator> {
        match self {
            Self::Sma => Box::new(sma::Sma::default()),
            Self::Ema => Box::new(ema::Ema::default()),
            Self::Bollinger => Box::new(bollinger::Bollinger::default()),
            Self::Macd => Box::new(macd::Macd::default()),
            Self::Kvo => Box::new(kvo::Kvo::default()),
            Self::Tsi => Box::new(tsi::Tsi::default()),
            Self::Adx => Box::new(adx::Adx::default()),
            Self::Rsi => Box::new(rsi::Rsi::default()),
            Self::Kox => Box::new(kox::Kox::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// IndicatorResult
// ---------------------------------------------------------------------------

/// Named output channels over a shared timestamp axis, trimmed to the
/// requested number of most-recent samples.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorResult {
    mts: Vec<i64>,
    channels: Vec<(&'static str, Vec<f64>)>,
}

impl IndicatorResult {
    pub(crate) fn new(mts: Vec<i64>) -> Self {
        Self {
            mts,
            channels: Vec::new(),
        }
    }

    /// Append a channel from a full-length lane, keeping only the trailing
    /// `len()` samples.  The lane must cover the whole computation axis.
    pub(crate) fn with_tail(mut self, name: &'static str, lane: &[f64]) -> Self {
        let take = self.mts.len();
        debug_assert!(lane.len() >= take);
        self.channels.push((name, lane[lane.len() - take..].to_vec()));
        self
    }

    pub fn len(&self) -> usize {
        self.mts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mts.is_empty()
    }

    pub fn mts(&self) -> &[i64] {
        &self.mts
    }

    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        self.channels
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Most recent sample of a channel.
    pub fn last(&self, name: &str) -> Option<f64> {
        self.channel(name)?.last().copied()
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.channels.iter().map(|(n, _)| *n)
    }
}

// ---------------------------------------------------------------------------
// Warm-up window check
// ---------------------------------------------------------------------------

/// Verify that `response_size` fits inside the valid region of an axis of
/// `axis_len` samples whose first meaningful index is `warmup`.
pub(crate) fn check_window(response_size: usize, axis_len: usize, warmup: usize) -> Result<()> {
    let available = axis_len.saturating_sub(warmup);
    if response_size == 0 || response_size > available {
        return Err(BotError::InsufficientHistory {
            needed: response_size,
            available,
        });
    }
    Ok(())
}
