// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean of the source over a trailing window.  Kept as a rolling
// sum so the lane costs O(n) regardless of window length.

use super::{check_window, Indicator, IndicatorResult};
use crate::error::{BotError, Result};
use crate::market_data::{CandleSeries, Source};

/// Full-length SMA lane; indices before `period - 1` hold 0.0.
pub(crate) fn sma_lane(values: &[f64], period: usize) -> Vec<f64> {
    debug_assert!(period > 0 && values.len() >= period);

    let mut lane = vec![0.0; values.len()];
    let mut window_sum: f64 = values[..period].iter().sum();
    lane[period - 1] = window_sum / period as f64;
    for i in period..values.len() {
        window_sum += values[i] - values[i - period];
        lane[i] = window_sum / period as f64;
    }
    lane
}

/// Simple moving average over a chosen price source.
///
/// Channel: `sma`.  Warm-up index: `period - 1`.
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    pub period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Default for Sma {
    fn default() -> Self {
        Self { period: 9 }
    }
}

impl Indicator for Sma {
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

        let lane = sma_lane(&values, self.period);
        Ok(IndicatorResult::new(series.mts_tail(response_size)).with_tail("sma", &lane))
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
    fn lane_known_values() {
        let values: Vec<f64> = (1..=6).map(|x| x as f64).collect();
        let lane = sma_lane(&values, 3);
        assert_eq!(lane, vec![0.0, 0.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn full_valid_span_is_served() {
        let series = series_from_closes(&(1..=12).map(|x| x as f64).collect::<Vec<_>>());
        let result = Sma::new(3).calculate(&series, 10, Source::Close).unwrap();
        assert_eq!(result.len(), 10);
        assert!((result.channel("sma").unwrap()[0] - 2.0).abs() < 1e-12);
        assert!((result.last("sma").unwrap() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn warmup_refusal() {
        let series = series_from_closes(&(1..=12).map(|x| x as f64).collect::<Vec<_>>());
        assert!(Sma::new(3).calculate(&series, 11, Source::Close).is_err());
    }

    #[test]
    fn volume_source_is_respected() {
        let series = series_from_closes(&[5.0; 10]);
        let result = Sma::new(4).calculate(&series, 3, Source::Volume).unwrap();
        assert!(result
            .channel("sma")
            .unwrap()
            .iter()
            .all(|v| (v - 100.0).abs() < 1e-12));
    }
}
