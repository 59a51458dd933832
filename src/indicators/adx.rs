// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// Quantifies trend strength regardless of direction, on the difference axis:
//
//   1. True Range per transition: max of (high-low), |high-prev_close|,
//      |low-prev_close|.
//   2. +DM / -DM from consecutive high/low deltas, each zeroed unless it is
//      positive and strictly larger than the other.
//   3. Wilder's running smoothing: sm[i] = sm[i-1] - sm[i-1]/period + x[i],
//      seeded with the plain sum of the first `smoothing` raw values.
//   4. +DI = 100 * sm(+DM)/sm(TR), -DI symmetric (0 when sm(TR) is 0).
//   5. DX = 100 * |+DI - -DI| / (+DI + -DI) (0 when the sum is 0).
//   6. ADX seeded with the SMA of the first `average` DX values, then
//      Wilder-smoothed forward: (prev * (average-1) + dx) / average.
//
// Interpretation: ADX > 25 trending, ADX < 20 ranging.

use super::{check_window, Indicator, IndicatorResult};
use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

/// Average directional index.  Ignores `source`: the formula is defined on
/// high/low/close directly.
///
/// Channels: `adx`, `plus_di`, `minus_di`, `histogram` (the DI spread),
/// timestamped by the newer bar of each pair.  Warm-up index (difference
/// axis): `smoothing + average - 2`.
#[derive(Debug, Clone, Copy)]
pub struct Adx {
    pub smoothing: usize,
    pub average: usize,
}

impl Adx {
    pub fn new(smoothing: usize, average: usize) -> Self {
        Self { smoothing, average }
    }
}

impl Default for Adx {
    fn default() -> Self {
        Self {
            smoothing: 14,
            average: 14,
        }
    }
}

impl Indicator for Adx {
    fn calculate(
        &self,
        series: &CandleSeries,
        response_size: usize,
        _source: Source,
    ) -> Result<IndicatorResult> {
        if self.smoothing == 0 || self.average == 0 {
            return Err(BotError::InsufficientHistory {
                needed: response_size,
                available: 0,
            });
        }
        let candles = series.candles();
        let axis_len = candles.len().saturating_sub(1);
        let warmup = self.smoothing + self.average - 2;
        check_window(response_size, axis_len, warmup)?;

        let period = self.smoothing as f64;

        // ── 1 & 2. Raw TR / +DM / -DM per transition ─────────────────────
        let mut tr = vec![0.0; axis_len];
        let mut plus_dm = vec![0.0; axis_len];
        let mut minus_dm = vec![0.0; axis_len];
        for i in 0..axis_len {
            let curr = &candles[i + 1];
            let prev = &candles[i];

            tr[i] = (curr.high - curr.low)
                .max((curr.high - prev.close).abs())
                .max((curr.low - prev.close).abs());

            let up_move = curr.high - prev.high;
            let down_move = prev.low - curr.low;
            plus_dm[i] = if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            };
            minus_dm[i] = if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            };
        }

        // ── 3. Wilder smoothing ──────────────────────────────────────────
        let mut sm_tr = vec![0.0; axis_len];
        let mut sm_plus = vec![0.0; axis_len];
        let mut sm_minus = vec![0.0; axis_len];
        let seed = self.smoothing - 1;
        sm_tr[seed] = tr[..self.smoothing].iter().sum();
        sm_plus[seed] = plus_dm[..self.smoothing].iter().sum();
        sm_minus[seed] = minus_dm[..self.smoothing].iter().sum();
        for i in self.smoothing..axis_len {
            sm_tr[i] = sm_tr[i - 1] - sm_tr[i - 1] / period + tr[i];
            sm_plus[i] = sm_plus[i - 1] - sm_plus[i - 1] / period + plus_dm[i];
            sm_minus[i] = sm_minus[i - 1] - sm_minus[i - 1] / period + minus_dm[i];
        }

        // ── 4 & 5. DI and DX lanes ───────────────────────────────────────
        let mut plus_di = vec![0.0; axis_len];
        let mut minus_di = vec![0.0; axis_len];
        let mut dx = vec![0.0; axis_len];
        for i in seed..axis_len {
            if sm_tr[i] != 0.0 {
                plus_di[i] = sm_plus[i] / sm_tr[i] * 100.0;
                minus_di[i] = sm_minus[i] / sm_tr[i] * 100.0;
            }
            let di_sum = plus_di[i] + minus_di[i];
            if di_sum != 0.0 {
                dx[i] = (plus_di[i] - minus_di[i]).abs() / di_sum * 100.0;
            }
        }

        // ── 6. ADX: SMA seed, Wilder forward ─────────────────────────────
        let adx_seed = self.smoothing + self.average - 2;
        let average = self.average as f64;
        let mut adx = vec![0.0; axis_len];
        adx[adx_seed] = dx[seed..seed + self.average].iter().sum::<f64>() / average;
        for i in adx_seed + 1..axis_len {
            adx[i] = (adx[i - 1] * (average - 1.0) + dx[i]) / average;
        }

        let histogram: Vec<f64> = plus_di
            .iter()
            .zip(minus_di.iter())
            .map(|(p, m)| p - m)
            .collect();

        Ok(IndicatorResult::new(series.mts_tail(response_size))
            .with_tail("adx", &adx)
            .with_tail("plus_di", &plus_di)
            .with_tail("minus_di", &minus_di)
            .with_tail("histogram", &histogram))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Candle;
    use crate::market_data::CandleSeries;

    fn candle(mts: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            mts,
            open,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    fn trending_series(bars: usize, step: f64) -> CandleSeries {
        let candles: Vec<Candle> = (0..bars)
            .map(|i| {
                let base = 100.0 + i as f64 * step;
                candle(i as i64 * 1_000, base, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect();
        CandleSeries::from_candles("BTCUSD", "3h", candles).unwrap()
    }

    #[test]
    fn strong_uptrend_reads_above_25() {
        let series = trending_series(80, 2.0);
        let result = Adx::default().calculate(&series, 10, Source::Close).unwrap();
        let value = result.last("adx").unwrap();
        assert!(value > 25.0, "expected ADX > 25 for a strong trend, got {value}");
        assert!(result.last("plus_di").unwrap() > result.last("minus_di").unwrap());
    }

    #[test]
    fn flat_market_reads_zero() {
        let candles = vec![candle(0, 100.0, 101.0, 99.0, 100.0); 80]
            .into_iter()
            .enumerate()
            .map(|(i, mut c)| {
                c.mts = i as i64 * 1_000;
                c
            })
            .collect();
        let series = CandleSeries::from_candles("BTCUSD", "3h", candles).unwrap();
        let result = Adx::default().calculate(&series, 10, Source::Close).unwrap();
        // No directional movement anywhere: DX = 0, so ADX converges to 0.
        assert!(result.channel("adx").unwrap().iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn adx_stays_in_range() {
        let candles: Vec<Candle> = (0..200)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                candle(i as i64 * 1_000, base - 0.5, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        let series = CandleSeries::from_candles("BTCUSD", "3h", candles).unwrap();
        let result = Adx::default().calculate(&series, 50, Source::Close).unwrap();
        assert!(result
            .channel("adx")
            .unwrap()
            .iter()
            .all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn warmup_boundary_is_exact() {
        // period 5/5 on the difference axis: warm-up index 8, so a series of
        // N candles (N-1 transitions) serves N-9 samples at most.
        let series = trending_series(15, 1.0);
        let adx = Adx::new(5, 5);
        assert!(adx.calculate(&series, 6, Source::Close).is_ok());
        assert!(adx.calculate(&series, 7, Source::Close).is_err());
    }
}
