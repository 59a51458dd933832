// =============================================================================
// Klinger Volume Oscillator (KVO)
// =============================================================================
//
// Works on the difference axis (one sample shorter than the candle series,
// since the first bar has no predecessor to diff against).  Each bar's volume
// is signed by the direction of the source price move — positive when the
// price rose or held, negative when it fell — then the oscillator is the
// spread between a fast and a slow EMA of that signed-volume lane:
//
//   sv[i]     = ±volume[i+1] by the sign of source[i+1] - source[i]
//   kvo       = EMA(fast)(sv) - EMA(slow)(sv)
//   signal    = EMA(signal_period)(kvo), seeded at the slow warm-up
//   histogram = kvo - signal
//
// Conventionally fed with the `hlc3` typical price.

use super::ema::{ema_lane, ema_lane_from};
use super::{check_window, Indicator, IndicatorResult};
use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

/// Klinger volume oscillator.
///
/// Channels: `kvo`, `signal`, `histogram`, timestamped by the newer bar of
/// each pair.  Warm-up index (difference axis): `slow + signal_period - 2`.
#[derive(Debug, Clone, Copy)]
pub struct Kvo {
    pub fast: usize,
    pub slow: usize,
    pub signal_period: usize,
}

impl Kvo {
    pub fn new(fast: usize, slow: usize, signal_period: usize) -> Self {
        Self {
            fast,
            slow,
            signal_period,
        }
    }
}

impl Default for Kvo {
    fn default() -> Self {
        Self {
            fast: 34,
            slow: 55,
            signal_period: 13,
        }
    }
}

impl Indicator for Kvo {
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
        let candles = series.candles();
        let axis_len = candles.len().saturating_sub(1);
        let warmup = self.slow + self.signal_period - 2;
        check_window(response_size, axis_len, warmup)?;

        // Signed volume per bar-to-bar transition.
        let mut signed_volume = vec![0.0; axis_len];
        for i in 0..axis_len {
            let change = source.value(&candles[i + 1]) - source.value(&candles[i]);
            signed_volume[i] = if change >= 0.0 {
                candles[i + 1].volume
            } else {
                -candles[i + 1].volume
            };
        }

        let fast = ema_lane(&signed_volume, self.fast);
        let slow = ema_lane(&signed_volume, self.slow);

        let mut kvo = vec![0.0; axis_len];
        for i in self.slow - 1..axis_len {
            kvo[i] = fast[i] - slow[i];
        }

        let signal = ema_lane_from(&kvo, self.signal_period, self.slow - 1);
        let histogram: Vec<f64> = kvo.iter().zip(signal.iter()).map(|(k, s)| k - s).collect();

        Ok(IndicatorResult::new(series.mts_tail(response_size))
            .with_tail("kvo", &kvo)
            .with_tail("signal", &signal)
            .with_tail("histogram", &histogram))
    }
}
