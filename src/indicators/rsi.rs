// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// Gain/loss split of the per-bar source change, Wilder-averaged:
//
//   avg[i] = (avg[i-1] * (period - 1) + x[i]) / period
//   rsi    = 100 - 100 / (1 + avg_gain / avg_loss)
//
// Edge rules, in this order: avg_loss == 0 => 100 (no down moves at all),
// else avg_gain == 0 => 0.  Both are defined substitutions, never errors.
//
// Thresholds: RSI > 70 overbought, RSI < 30 oversold.

use super::{check_window, Indicator, IndicatorResult};
use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

/// Relative strength index over a chosen price source.
///
/// Channel: `rsi`, timestamped by the newer bar of each pair.
/// Warm-up index (difference axis): `period - 1`.
#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    pub period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

impl Indicator for Rsi {
    fn calculate(
        &self,
        series: &CandleSeries,
        response_size: usize,
        source: Source,
    ) -> Result<IndicatorResult> {
        if self.period == 0 {
            return Err(BotError::InsufficientHistory {
                needed: response_size,
                available: 0,
            });
        }
        let candles = series.candles();
        let axis_len = candles.len().saturating_sub(1);
        check_window(response_size, axis_len, self.period - 1)?;

        let mut gain = vec![0.0; axis_len];
        let mut loss = vec![0.0; axis_len];
        for i in 0..axis_len {
            let change = source.value(&candles[i + 1]) - source.value(&candles[i]);
            if change > 0.0 {
                gain[i] = change;
            } else {
                loss[i] = change.abs();
            }
        }

        let period = self.period as f64;
        let mut avg_gain = gain[..self.period].iter().sum::<f64>() / period;
        let mut avg_loss = loss[..self.period].iter().sum::<f64>() / period;

        let mut rsi = vec![0.0; axis_len];
        rsi[self.period - 1] = rsi_from_averages(avg_gain, avg_loss);
        for i in self.period..axis_len {
            avg_gain = (avg_gain * (period - 1.0) + gain[i]) / period;
            avg_loss = (avg_loss * (period - 1.0) + loss[i]) / period;
            rsi[i] = rsi_from_averages(avg_gain, avg_loss);
        }

        Ok(IndicatorResult::new(series.mts_tail(response_size)).with_tail("rsi", &rsi))
    }
}
