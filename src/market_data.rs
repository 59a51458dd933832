// =============================================================================
// Market data model — candles, price sources, tickers, candle series
// =============================================================================
//
// A `CandleSeries` is an immutable-between-refreshes snapshot of the most
// recent `size` OHLCV bars for one `(trade_pair, time_frame)` identity,
// oldest first.  `refresh` replaces the whole sequence in one shot; nothing
// ever patches it incrementally.  Indicators receive the series by shared
// reference and must not mutate it.

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::exchange::MarketData;

// ---------------------------------------------------------------------------
// Candle
// ---------------------------------------------------------------------------

/// A single OHLCV bar.  `mts` is the bar's open timestamp in epoch millis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub mts: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl Candle {
    /// Midpoint of the bar's range.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Typical price.
    pub fn hlc3(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Mean of all four prices.
    pub fn ohlc4(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Which lane of a candle feeds an indicator formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Open,
    High,
    Low,
    Close,
    Hl2,
    Hlc3,
    Ohlc4,
    Volume,
}

impl Source {
    /// Extract this source's value from a candle.
    pub fn value(self, candle: &Candle) -> f64 {
        match self {
            Self::Open => candle.open,
            Self::High => candle.high,
            Self::Low => candle.low,
            Self::Close => candle.close,
            Self::Hl2 => candle.hl2(),
            Self::Hlc3 => candle.hlc3(),
            Self::Ohlc4 => candle.ohlc4(),
            Self::Volume => candle.volume,
        }
    }
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Best-quote snapshot from the market-data collaborator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Ticker {
    pub bid: f64,
    pub ask: f64,
    pub last_price: f64,
    pub daily_volume: f64,
    pub high: f64,
    pub low: f64,
}

// ---------------------------------------------------------------------------
// CandleSeries
// ---------------------------------------------------------------------------

/// Ordered history of exactly `size` candles, oldest first.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    trade_pair: String,
    time_frame: String,
    size: usize,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Create an empty series bound to a pair and time frame.  It holds no
    /// candles until the first `refresh`.
    pub fn new(trade_pair: impl Into<String>, time_frame: impl Into<String>, size: usize) -> Self {
        Self {
            trade_pair: trade_pair.into(),
            time_frame: time_frame.into(),
            size,
            candles: Vec::new(),
        }
    }

    /// Build a series directly from a candle vector (backfills, tests).
    ///
    /// Fails with `DataUnavailable` when the vector length differs from
    /// `size` or the timestamps are not non-decreasing oldest-first.
    pub fn from_candles(
        trade_pair: impl Into<String>,
        time_frame: impl Into<String>,
        candles: Vec<Candle>,
    ) -> Result<Self> {
        let mut series = Self::new(trade_pair, time_frame, candles.len());
        series.replace(candles)?;
        Ok(series)
    }

    /// Fetch exactly `size` bars from the collaborator and replace the
    /// internal sequence.  On any failure the previous sequence is kept.
    pub fn refresh(&mut self, source: &dyn MarketData) -> Result<()> {
        let candles = source.fetch_candles(&self.trade_pair, &self.time_frame, self.size)?;
        self.replace(candles)
    }

    fn replace(&mut self, candles: Vec<Candle>) -> Result<()> {
        if candles.len() != self.size {
            return Err(BotError::DataUnavailable(format!(
                "{}:{} delivered {} candles, {} required",
                self.trade_pair,
                self.time_frame,
                candles.len(),
                self.size
            )));
        }
        if candles.windows(2).any(|w| w[0].mts > w[1].mts) {
            return Err(BotError::DataUnavailable(format!(
                "{}:{} candle timestamps are not oldest-first",
                self.trade_pair, self.time_frame
            )));
        }
        self.candles = candles;
        Ok(())
    }

    pub fn trade_pair(&self) -> &str {
        &self.trade_pair
    }

    pub fn time_frame(&self) -> &str {
        &self.time_frame
    }

    /// The fixed logical size.  Equals `len()` after a successful refresh.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Extract one source lane across the whole series.
    pub fn source_values(&self, source: Source) -> Vec<f64> {
        self.candles.iter().map(|c| source.value(c)).collect()
    }

    /// The `count` most recent timestamps, oldest first.
    pub fn mts_tail(&self, count: usize) -> Vec<i64> {
        let start = self.candles.len().saturating_sub(count);
        self.candles[start..].iter().map(|c| c.mts).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn bar(mts: i64, close: f64) -> Candle {
        Candle {
            mts,
            open: close - 1.0,
            close,
            high: close + 2.0,
            low: close - 2.0,
            volume: 10.0,
        }
    }

    #[test]
    fn derived_price_composites() {
        let c = Candle {
            mts: 0,
            open: 10.0,
            close: 14.0,
            high: 20.0,
            low: 8.0,
            volume: 1.0,
        };
        assert!((c.hl2() - 14.0).abs() < 1e-12);
        assert!((c.hlc3() - 14.0).abs() < 1e-12);
        assert!((c.ohlc4() - 13.0).abs() < 1e-12);
        assert!((Source::Volume.value(&c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn from_candles_accepts_ordered() {
        let series =
            CandleSeries::from_candles("BTCUSD", "3h", (0..5).map(|i| bar(i, 100.0)).collect())
                .unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.size(), 5);
        assert_eq!(series.last().unwrap().mts, 4);
    }

    #[test]
    fn from_candles_rejects_unordered() {
        let candles = vec![bar(3, 100.0), bar(1, 100.0), bar(2, 100.0)];
        assert!(CandleSeries::from_candles("BTCUSD", "3h", candles).is_err());
    }

    #[test]
    fn refresh_keeps_previous_on_short_delivery() {
        struct Short;
        impl MarketData for Short {
            fn fetch_candles(&self, _: &str, _: &str, count: usize) -> Result<Vec<Candle>> {
                Ok((0..count as i64 - 1).map(|i| bar(i, 100.0)).collect())
            }
            fn fetch_ticker(&self, _: &str) -> Result<Ticker> {
                Ok(Ticker::default())
            }
        }

        let mut series =
            CandleSeries::from_candles("BTCUSD", "3h", (0..4).map(|i| bar(i, 5.0)).collect())
                .unwrap();
        assert!(series.refresh(&Short).is_err());
        // The old snapshot survives a failed refresh.
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn mts_tail_returns_newest_last() {
        let series =
            CandleSeries::from_candles("BTCUSD", "3h", (0..6).map(|i| bar(i, 1.0)).collect())
                .unwrap();
        assert_eq!(series.mts_tail(3), vec![3, 4, 5]);
        assert_eq!(series.mts_tail(10).len(), 6);
    }
}
