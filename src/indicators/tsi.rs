// =============================================================================
// True Strength Index (TSI)
// =============================================================================
//
// Double-smoothed momentum on the difference axis:
//
//   change[i]  = source[i+1] - source[i]
//   num        = EMA(second)(EMA(first)(change))
//   den        = EMA(second)(EMA(first)(|change|))
//   tsi        = 100 * num / den          (defined as 0 when den is 0)
//   signal     = EMA(signal_period)(tsi)
//   histogram  = tsi - signal
//
// The zero-denominator rule matters in practice: a dead-flat series produces
// zero absolute change everywhere and the ratio must stay a defined 0, not
// NaN.

use super::ema::ema_lane_from;
use super::{check_window, Indicator, IndicatorResult};
use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

/// True strength index.
///
/// Channels: `tsi`, `signal`, `histogram`, timestamped by the newer bar of
/// each pair.  Warm-up index (difference axis):
/// `first + second + signal_period - 3`.
#[derive(Debug, Clone, Copy)]
pub struct Tsi {
    pub first: usize,
    pub second: usize,
    pub signal_period: usize,
}

impl Tsi {
    pub fn new(first: usize, second: usize, signal_period: usize) -> Self {
        Self {
            first,
            second,
            signal_period,
        }
    }
}

impl Default for Tsi {
    fn default() -> Self {
        Self {
            first: 25,
            second: 13,
            signal_period: 13,
        }
    }
}

impl Indicator for Tsi {
    fn calculate(
        &self,
        series: &CandleSeries,
        response_size: usize,
        source: Source,
    ) -> Result<IndicatorResult> {
        if self.first == 0 || self.second == 0 || self.signal_period == 0 {
            return Err(BotError::InsufficientHistory {
                needed: response_size,
                available: 0,
            });
        }
        let candles = series.candles();
        let axis_len = candles.len().saturating_sub(1);
        let warmup = self.first + self.second + self.signal_period - 3;
        check_window(response_size, axis_len, warmup)?;

        let mut change = vec![0.0; axis_len];
        let mut change_abs = vec![0.0; axis_len];
        for i in 0..axis_len {
            change[i] = source.value(&candles[i + 1]) - source.value(&candles[i]);
            change_abs[i] = change[i].abs();
        }

        let first_num = ema_lane_from(&change, self.first, 0);
        let first_den = ema_lane_from(&change_abs, self.first, 0);

        let second_start = self.first - 1;
        let num = ema_lane_from(&first_num, self.second, second_start);
        let den = ema_lane_from(&first_den, self.second, second_start);

        let tsi_start = self.first + self.second - 2;
        let mut tsi = vec![0.0; axis_len];
        for i in tsi_start..axis_len {
            tsi[i] = if den[i] == 0.0 {
                0.0
            } else {
                100.0 * num[i] / den[i]
            };
        }

        let signal = ema_lane_from(&tsi, self.signal_period, tsi_start);
        let histogram: Vec<f64> = tsi.iter().zip(signal.iter()).map(|(t, s)| t - s).collect();

        Ok(IndicatorResult::new(series.mts_tail(response_size))
            .with_tail("tsi", &tsi)
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
    fn flat_series_resolves_to_zero_not_nan() {
        let series = series_from_closes(&[77.0; 120]);
        let result = Tsi::default().calculate(&series, 20, Source::Close).unwrap();
        for name in ["tsi", "signal", "histogram"] {
            assert!(
                result.channel(name).unwrap().iter().all(|v| *v == 0.0),
                "{name} must be a defined 0 on a flat series"
            );
        }
    }

    #[test]
    fn monotonic_rise_saturates_at_plus_100() {
        // Uniform +1 change: num == den, so tsi = 100 everywhere valid.
        let closes: Vec<f64> = (1..=150).map(|x| x as f64).collect();
        let series = series_from_closes(&closes);
        let result = Tsi::default().calculate(&series, 30, Source::Close).unwrap();
        assert!(result
            .channel("tsi")
            .unwrap()
            .iter()
            .all(|v| (v - 100.0).abs() < 1e-9));
    }

    #[test]
    fn tsi_stays_within_bounds() {
        let closes: Vec<f64> = (0..300)
            .map(|i| 100.0 + (i as f64 * 0.9).sin() * 15.0)
            .collect();
        let series = series_from_closes(&closes);
        let result = Tsi::default().calculate(&series, 60, Source::Close).unwrap();
        assert!(result
            .channel("tsi")
            .unwrap()
            .iter()
            .all(|v| (-100.0..=100.0).contains(v)));
    }

    #[test]
    fn warmup_spans_all_three_smoothings() {
        // 80 candles = 79 transitions; warm-up 25 + 13 + 13 - 3 = 48 => 31 valid.
        let closes: Vec<f64> = (1..=80).map(|x| x as f64).collect();
        let series = series_from_closes(&closes);
        assert!(Tsi::default().calculate(&series, 31, Source::Close).is_ok());
        assert!(Tsi::default().calculate(&series, 32, Source::Close).is_err());
    }
}
