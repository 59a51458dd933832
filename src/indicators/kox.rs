// =============================================================================
// KOX — EMA momentum composite
// =============================================================================
//
// A rate-of-change oscillator taken on a smoothed price instead of the raw
// price: smooth the source with a long EMA, measure the percent change of
// that EMA over a short look-back, then smooth the resulting momentum into a
// signal line.
//
//   ema[i]             = EMA(base)(source)
//   roc[i]             = (ema[i] - ema[i-lookback]) / ema[i-lookback] * 100
//   ema_change_perc[i] = one-bar percent change of the EMA
//   signal             = EMA(signal_period)(roc)
//
// Percent changes against a zero reference are defined as 0.  The dashboard
// strategy consumes only the `roc` channel (renamed `kox`).

use super::ema::{ema_lane, ema_lane_from};
use super::{check_window, Indicator, IndicatorResult};
use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

/// EMA rate-of-change composite oscillator.
///
/// Channels: `ema`, `ema_change_perc`, `roc`, `signal`.
/// Warm-up index: `base + lookback + signal_period - 2` (the signal seed).
#[derive(Debug, Clone, Copy)]
pub struct Kox {
    pub base: usize,
    pub lookback: usize,
    pub signal_period: usize,
}

impl Kox {
    pub fn new(base: usize, lookback: usize, signal_period: usize) -> Self {
        Self {
            base,
            lookback,
            signal_period,
        }
    }
}

impl Default for Kox {
    fn default() -> Self {
        Self {
            base: 198,
            lookback: 8,
            signal_period: 4,
        }
    }
}

impl Indicator for Kox {
    fn calculate(
        &self,
        series: &CandleSeries,
        response_size: usize,
        source: Source,
    ) -> Result<IndicatorResult> {
        if self.base == 0 || self.lookback == 0 || self.signal_period == 0 {
            return Err(BotError::InsufficientHistory {
                needed: response_size,
                available: 0,
            });
        }
        let values = series.source_values(source);
        let roc_start = self.base - 1 + self.lookback;
        let warmup = roc_start + self.signal_period - 1;
        check_window(response_size, values.len(), warmup)?;

        let ema = ema_lane(&values, self.base);

        let n = values.len();
        let mut roc = vec![0.0; n];
        for i in roc_start..n {
            let reference = ema[i - self.lookback];
            roc[i] = if reference == 0.0 {
                0.0
            } else {
                (ema[i] - reference) / reference * 100.0
            };
        }

        let mut ema_change_perc = vec![0.0; n];
        for i in self.base..n {
            ema_change_perc[i] = if ema[i - 1] == 0.0 {
                0.0
            } else {
                (ema[i] - ema[i - 1]) / ema[i - 1] * 100.0
            };
        }

        let signal = ema_lane_from(&roc, self.signal_period, roc_start);

        Ok(IndicatorResult::new(series.mts_tail(response_size))
            .with_tail("ema", &ema)
            .with_tail("ema_change_perc", &ema_change_perc)
            .with_tail("roc", &roc)
            .with_tail("signal", &signal))
    }
}
