// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent samples, making it more responsive to new
// information than the Simple Moving Average.
//
// Formula:
//   k     = 2 / (period + 1)
//   ema_t = (x_t - ema_{t-1}) * k + ema_{t-1}
//
// The very first value is seeded with the SMA of the first `period` samples,
// placed at index `period - 1`.  The same seeding rule drives every derived
// smoothing in the library (MACD/KVO/TSI signals, KOX), which is why the
// lane builder below accepts an arbitrary start offset.

use super::{check_window, IndicatorResult};
use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

use super::Indicator;

/// Build a full-length EMA lane over `values`, seeded with the arithmetic
/// mean of `values[start .. start + period]` placed at `start + period - 1`.
///
/// Indices before the seed hold 0.0 — pre-warm-up placeholders that callers
/// must never serve.
pub(crate) fn ema_lane_from(values: &[f64], period: usize, start: usize) -> Vec<f64> {
    debug_assert!(period > 0 && values.len() >= start + period);

    let mut lane = vec![0.0; values.len()];
    let seed_index = start + period - 1;
    lane[seed_index] = values[start..=seed_index].iter().sum::<f64>() / period as f64;

    let k = 2.0 / (period as f64 + 1.0);
    for i in seed_index + 1..values.len() {
        lane[i] = (values[i] - lane[i - 1]) * k + lane[i - 1];
    }
    lane
}

/// EMA lane seeded at the start of the axis.
pub(crate) fn ema_lane(values: &[f64], period: usize) -> Vec<f64> {
    ema_lane_from(values, period, 0)
}

/// Exponential moving average over a chosen price source.
///
/// Channel: `ema`.  Warm-up index: `period - 1`.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    pub period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Default for Ema {
    fn default() -> Self {
        Self { period: 9 }
    }
}

impl Indicator for Ema {
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
        let values = series.source_values(source);
        check_window(response_size, values.len(), self.period - 1)?;

        let lane = ema_lane(&values, self.period);
        Ok(IndicatorResult::new(series.mts_tail(response_size)).with_tail("ema", &lane))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::tests::series_from_closes;

    #[test]
    fn lane_seeds_with_plain_mean() {
        // 5-period EMA of [1..=10]: seed = (1+2+3+4+5)/5 = 3.0 at index 4.
        let values: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let lane = ema_lane(&values, 5);
        assert!((lane[4] - 3.0).abs() < 1e-10);
        assert!(lane[..4].iter().all(|&v| v == 0.0));

        let k = 2.0 / 6.0;
        let mut expected = 3.0;
        for (i, &v) in values.iter().enumerate().skip(5) {
            expected = (v - expected) * k + expected;
            assert!((lane[i] - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn offset_seed_matches_shifted_axis() {
        let values = vec![0.0, 0.0, 2.0, 4.0, 6.0, 8.0];
        let lane = ema_lane_from(&values, 3, 2);
        // Seed over values[2..5] = (2+4+6)/3 = 4.0 at index 4.
        assert!((lane[4] - 4.0).abs() < 1e-10);
        assert!((lane[5] - ((8.0 - 4.0) * 0.5 + 4.0)).abs() < 1e-10);
    }

    #[test]
    fn constant_series_converges_to_price() {
        let series = series_from_closes(&[42.0; 50]);
        let result = Ema::new(9).calculate(&series, 30, Source::Close).unwrap();
        assert_eq!(result.len(), 30);
        assert!(result
            .channel("ema")
            .unwrap()
            .iter()
            .all(|v| (v - 42.0).abs() < 1e-10));
    }

    #[test]
    fn response_is_trimmed_newest_last() {
        let closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let series = series_from_closes(&closes);
        let result = Ema::new(9).calculate(&series, 5, Source::Close).unwrap();
        assert_eq!(result.len(), 5);
        assert_eq!(*result.mts().last().unwrap(), 40_000);
        // Full-lane value at the final index must equal the served last value.
        let lane = ema_lane(&closes, 9);
        assert!((result.last("ema").unwrap() - lane[39]).abs() < 1e-12);
    }

    #[test]
    fn idempotent_over_immutable_series() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let series = series_from_closes(&closes);
        let ema = Ema::new(9);
        let a = ema.calculate(&series, 20, Source::Close).unwrap();
        let b = ema.calculate(&series, 20, Source::Close).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn warmup_refusal() {
        let series = series_from_closes(&(1..=30).map(|x| x as f64).collect::<Vec<_>>());
        // 30 bars, warm-up index 8 => 22 valid samples.
        assert!(Ema::new(9).calculate(&series, 22, Source::Close).is_ok());
        let err = Ema::new(9).calculate(&series, 23, Source::Close).unwrap_err();
        assert!(matches!(
            err,
            BotError::InsufficientHistory {
                needed: 23,
                available: 22
            }
        ));
    }

    #[test]
    fn zero_period_is_refused() {
        let series = series_from_closes(&[1.0; 10]);
        assert!(Ema::new(0).calculate(&series, 1, Source::Close).is_err());
    }
}
