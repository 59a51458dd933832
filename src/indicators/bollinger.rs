// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band (basis) = SMA(period); upper/lower = basis ± mult * σ, where σ
// is the population standard deviation over the same trailing window (sum of
// squared deviations from the basis divided by the window length, rooted).
// Bandwidth = (upper - lower) / basis * 100, defined as 0 when the basis is 0.
//
// The deviation needs a full basis window behind it before it means anything,
// so the warm-up index is 2 * (period - 1).

use super::sma::sma_lane;
use super::{check_window, Indicator, IndicatorResult};
use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

/// Bollinger band envelope over a chosen price source.
///
/// Channels: `basis`, `upper`, `lower`, `bandwidth`.
/// Warm-up index: `2 * (period - 1)`.
#[derive(Debug, Clone, Copy)]
pub struct Bollinger {
    pub period: usize,
    pub mult: f64,
}

impl Bollinger {
    pub fn new(period: usize, mult: f64) -> Self {
        Self { period, mult }
    }
}

impl Default for Bollinger {
    fn default() -> Self {
        Self {
            period: 20,
            mult: 2.0,
        }
    }
}

impl Indicator for Bollinger {
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
        let warmup = 2 * (self.period - 1);
        check_window(response_size, values.len(), warmup)?;

        let n = values.len();
        let period = self.period;
        let basis = sma_lane(&values, period);

        let mut upper = vec![0.0; n];
        let mut lower = vec![0.0; n];
        let mut bandwidth = vec![0.0; n];

        for j in period - 1..n {
            let mut squared_sum = 0.0;
            for &value in &values[j + 1 - period..=j] {
                let deviation = value - basis[j];
                squared_sum += deviation * deviation;
            }
            let std_dev = (squared_sum / period as f64).sqrt();

            upper[j] = basis[j] + self.mult * std_dev;
            lower[j] = basis[j] - self.mult * std_dev;
            bandwidth[j] = if basis[j] == 0.0 {
                0.0
            } else {
                (upper[j] - lower[j]) / basis[j] * 100.0
            };
        }

        Ok(IndicatorResult::new(series.mts_tail(response_size))
            .with_tail("basis", &basis)
            .with_tail("upper", &upper)
            .with_tail("lower", &lower)
            .with_tail("bandwidth", &bandwidth))
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
    fn bands_envelope_the_basis() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0).collect();
        let series = series_from_closes(&closes);
        let result = Bollinger::default()
            .calculate(&series, 30, Source::Close)
            .unwrap();

        let basis = result.channel("basis").unwrap();
        let upper = result.channel("upper").unwrap();
        let lower = result.channel("lower").unwrap();
        let bandwidth = result.channel("bandwidth").unwrap();
        for i in 0..result.len() {
            assert!(lower[i] <= basis[i] && basis[i] <= upper[i]);
            assert!(bandwidth[i] >= 0.0);
        }
    }

    #[test]
    fn flat_series_collapses_the_envelope() {
        let series = series_from_closes(&[100.0; 60]);
        let result = Bollinger::default()
            .calculate(&series, 10, Source::Close)
            .unwrap();
        assert!(result
            .channel("bandwidth")
            .unwrap()
            .iter()
            .all(|v| v.abs() < 1e-10));
        assert!((result.last("upper").unwrap() - 100.0).abs() < 1e-10);
        assert!((result.last("lower").unwrap() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn population_std_dev_known_window() {
        // Window [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, population σ = 2.
        let mut closes = vec![5.0; 7]; // padding to satisfy the doubled warm-up
        closes.extend([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let series = series_from_closes(&closes);
        let result = Bollinger::new(8, 2.0)
            .calculate(&series, 1, Source::Close)
            .unwrap();
        assert!((result.last("basis").unwrap() - 5.0).abs() < 1e-10);
        assert!((result.last("upper").unwrap() - 9.0).abs() < 1e-10);
        assert!((result.last("lower").unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn doubled_warmup_is_enforced() {
        // 40 bars, period 20: warm-up index 38 leaves exactly 2 valid samples.
        let series = series_from_closes(&(1..=40).map(|x| x as f64).collect::<Vec<_>>());
        assert!(Bollinger::default()
            .calculate(&series, 2, Source::Close)
            .is_ok());
        assert!(Bollinger::default()
            .calculate(&series, 3, Source::Close)
            .is_err());
    }
}
