// =============================================================================
// Moving Average Convergence/Divergence (MACD)
// =============================================================================
//
// macd      = EMA(fast) - EMA(slow), both seeded independently on the source
// signal    = EMA(signal_period) of the macd lane, seeded once the macd lane
//             has `signal_period` valid samples starting at `slow - 1`
// histogram = macd - signal

use super::ema::{ema_lane, ema_lane_from};
use super::{check_window, Indicator, IndicatorResult};
use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

/// MACD oscillator over a chosen price source.
///
/// Channels: `macd`, `signal`, `histogram`.
/// Warm-up index: `slow + signal_period - 2` (the signal seed).
#[derive(Debug, Clone, Copy)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal_period: usize,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal_period: usize) -> Self {
        Self {
            fast,
            slow,
            signal_period,
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal_period: 9,
        }
    }
}

impl Indicator for Macd {
    fn calculate(
        &self,
        series: &CandleSeries,
        response_size: usize,
        source: Source,
    ) -> Result<IndicatorResult> {
        if self.fast == 0 || self.slow == 0 || self.signal_period == 0 || self.fast >= self.slow {
            return Err(BotError::InsufficientHistory {
                needed: response_size,
                available: 0,
            });
        }
        let values = series.source_values(source);
        let warmup = self.slow + self.signal_period - 2;
        check_window(response_size, values.len(), warmup)?;

        let fast = ema_lane(&values, self.fast);
        let slow = ema_lane(&values, self.slow);

        // The macd lane is meaningless before the slow seed; keep the
        // placeholder zeros there so the signal seed averages real samples.
        let mut macd = vec![0.0; values.len()];
        for i in self.slow - 1..values.len() {
            macd[i] = fast[i] - slow[i];
        }

        let signal = ema_lane_from(&macd, self.signal_period, self.slow - 1);
        let histogram: Vec<f64> = macd
            .iter()
            .zip(signal.iter())
            .map(|(m, s)| m - s)
            .collect();

        Ok(IndicatorResult::new(series.mts_tail(response_size))
            .with_tail("macd", &macd)
            .with_tail("signal", &signal)
            .with_tail("histogram", &histogram))
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
    fn constant_series_is_all_zero() {
        let series = series_from_closes(&[250.0; 120]);
        let result = Macd::default()
            .calculate(&series, 40, Source::Close)
            .unwrap();
        for name in ["macd", "signal", "histogram"] {
            assert!(
                result.channel(name).unwrap().iter().all(|v| v.abs() < 1e-9),
                "{name} should be flat-zero on a constant series"
            );
        }
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let closes: Vec<f64> = (0..150).map(|i| 100.0 + (i as f64 * 0.2).sin() * 8.0).collect();
        let series = series_from_closes(&closes);
        let result = Macd::default()
            .calculate(&series, 50, Source::Close)
            .unwrap();
        let macd = result.channel("macd").unwrap();
        let signal = result.channel("signal").unwrap();
        let histogram = result.channel("histogram").unwrap();
        for i in 0..result.len() {
            assert!((histogram[i] - (macd[i] - signal[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn rising_series_has_positive_macd() {
        let closes: Vec<f64> = (1..=150).map(|x| x as f64).collect();
        let series = series_from_closes(&closes);
        let result = Macd::default()
            .calculate(&series, 20, Source::Close)
            .unwrap();
        // Fast EMA tracks a rising price more closely than slow EMA.
        assert!(result.channel("macd").unwrap().iter().all(|&v| v > 0.0));
    }

    #[test]
    fn warmup_covers_the_signal_seed() {
        // warm-up index = 26 + 9 - 2 = 33; 40 bars leave 7 valid samples.
        let series = series_from_closes(&(1..=40).map(|x| x as f64).collect::<Vec<_>>());
        assert!(Macd::default().calculate(&series, 7, Source::Close).is_ok());
        assert!(Macd::default().calculate(&series, 8, Source::Close).is_err());
    }

    #[test]
    fn degenerate_windows_are_refused() {
        let series = series_from_closes(&(1..=60).map(|x| x as f64).collect::<Vec<_>>());
        assert!(Macd::new(26, 12, 9).calculate(&series, 5, Source::Close).is_err());
        assert!(Macd::new(0, 26, 9).calculate(&series, 5, Source::Close).is_err());
    }
}
