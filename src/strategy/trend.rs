// =============================================================================
// Trend-following strategy — dual-EMA crossover
// =============================================================================
//
// A fast and a slow EMA of the close, joined on timestamp.  Only the last
// two rows matter for the reduction:
//
//   prev fast < slow,  last fast > slow   => strong buy   (fresh golden cross)
//   prev fast < slow,  no cross           => weak sell    (sustained downtrend)
//   prev fast > slow,  last fast < slow   => strong sell  (fresh death cross)
//   prev fast > slow,  no cross           => weak buy     (sustained uptrend)
//   prev exactly equal                    => neutral

use tracing::debug;

use super::frame::Frame;
use super::{SignalCode, Strategy};
use crate::error::{BotError, Result};
use crate::indicators::ema::Ema;
use crate::indicators::Indicator;
use crate::market_data::{CandleSeries, Source};

/// Dual-EMA crossover over the close price.
#[derive(Debug)]
pub struct TrendStrategy {
    fast: usize,
    slow: usize,
    frame: Option<Frame>,
}

impl TrendStrategy {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self {
            fast,
            slow,
            frame: None,
        }
    }
}

impl Default for TrendStrategy {
    fn default() -> Self {
        Self::new(91, 198)
    }
}

/// The crossover reduction over the two most recent aligned rows.
fn crossover_code(fast_prev: f64, slow_prev: f64, fast_last: f64, slow_last: f64) -> SignalCode {
    if fast_prev < slow_prev {
        if fast_last > slow_last {
            SignalCode::StrongBuy
        } else {
            SignalCode::WeakSell
        }
    } else if fast_prev > slow_prev {
        if fast_last < slow_last {
            SignalCode::StrongSell
        } else {
            SignalCode::WeakBuy
        }
    } else {
        SignalCode::Neutral
    }
}

impl Strategy for TrendStrategy {
    fn think(&mut self, series: &CandleSeries, response_size: usize) -> Result<SignalCode> {
        // The reduction reads the last two rows.
        if response_size < 2 {
            return Err(BotError::InsufficientHistory {
                needed: 2,
                available: response_size,
            });
        }

        let fast = Ema::new(self.fast).calculate(series, response_size, Source::Close)?;
        let slow = Ema::new(self.slow).calculate(series, response_size, Source::Close)?;

        let frame = Frame::from_result("fast_ema", &fast, &[("ema", "fast_ema")])
            .merge(Frame::from_result("slow_ema", &slow, &[("ema", "slow_ema")]))?;

        // merge guarantees both columns and >= 2 rows here
        let fast_last = frame.nth_back("fast_ema", 0).unwrap_or(0.0);
        let fast_prev = frame.nth_back("fast_ema", 1).unwrap_or(0.0);
        let slow_last = frame.nth_back("slow_ema", 0).unwrap_or(0.0);
        let slow_prev = frame.nth_back("slow_ema", 1).unwrap_or(0.0);

        let code = crossover_code(fast_prev, slow_prev, fast_last, slow_last);
        debug!(
            fast_prev,
            slow_prev,
            fast_last,
            slow_last,
            code = %code,
            "trend strategy evaluated"
        );

        self.frame = Some(frame);
        Ok(code)
    }

    fn snapshot(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::tests::series_from_closes;

    // ---- crossover_code ----------------------------------------------------

    #[test]
    fn reduction_covers_all_five_cases() {
        // Fresh golden cross.
        assert_eq!(crossover_code(1.0, 2.0, 3.0, 2.0), SignalCode::StrongBuy);
        // Sustained below, no cross.
        assert_eq!(crossover_code(1.0, 2.0, 1.5, 2.0), SignalCode::WeakSell);
        // Fresh death cross.
        assert_eq!(crossover_code(3.0, 2.0, 1.0, 2.0), SignalCode::StrongSell);
        // Sustained above, no cross.
        assert_eq!(crossover_code(3.0, 2.0, 2.5, 2.0), SignalCode::WeakBuy);
        // Exactly equal on the previous row.
        assert_eq!(crossover_code(2.0, 2.0, 9.0, 1.0), SignalCode::Neutral);
    }

    // ---- think -------------------------------------------------------------

    #[test]
    fn ascending_series_reads_weak_buy() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        let series = series_from_closes(&closes);
        let mut strategy = TrendStrategy::new(3, 9);
        assert_eq!(strategy.think(&series, 20).unwrap(), SignalCode::WeakBuy);
        // Snapshot is retained for reporting.
        let frame = strategy.snapshot().unwrap();
        assert!(frame.last("fast_ema").unwrap() > frame.last("slow_ema").unwrap());
    }

    #[test]
    fn descending_series_reads_weak_sell() {
        let closes: Vec<f64> = (1..=60).rev().map(|x| x as f64).collect();
        let series = series_from_closes(&closes);
        let mut strategy = TrendStrategy::new(3, 9);
        assert_eq!(strategy.think(&series, 20).unwrap(), SignalCode::WeakSell);
    }

    #[test]
    fn constant_series_reads_neutral() {
        let series = series_from_closes(&[100.0; 60]);
        let mut strategy = TrendStrategy::new(3, 9);
        assert_eq!(strategy.think(&series, 20).unwrap(), SignalCode::Neutral);
    }

    #[test]
    fn terminal_spike_reads_strong_buy() {
        // A long decline keeps the fast EMA below the slow one; a violent
        // final bar drags the fast EMA across on the very last row.
        let mut closes: Vec<f64> = (0..59).map(|i| 300.0 - i as f64).collect();
        closes.push(2_000.0);
        let series = series_from_closes(&closes);
        let mut strategy = TrendStrategy::new(2, 4);
        assert_eq!(strategy.think(&series, 20).unwrap(), SignalCode::StrongBuy);
    }

    #[test]
    fn terminal_plunge_reads_strong_sell() {
        let mut closes: Vec<f64> = (0..59).map(|i| 300.0 + i as f64).collect();
        closes.push(1.0);
        let series = series_from_closes(&closes);
        let mut strategy = TrendStrategy::new(2, 4);
        assert_eq!(strategy.think(&series, 20).unwrap(), SignalCode::StrongSell);
    }

    #[test]
    fn single_row_request_is_refused() {
        let series = series_from_closes(&[100.0; 60]);
        let mut strategy = TrendStrategy::new(3, 9);
        assert!(strategy.think(&series, 1).is_err());
    }
}
