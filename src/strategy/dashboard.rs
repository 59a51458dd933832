// =============================================================================
// Dashboard strategy — multi-indicator overview table
// =============================================================================
//
// Joins three SMAs, RSI, Bollinger bands and the KOX momentum composite on
// one timestamp axis.  It is informational only: `think` builds the table
// for the cycle report and always answers Neutral.  Whether a combining rule
// belongs here is a known gap inherited from the reference behavior — none
// is invented.

use tracing::debug;

use super::frame::Frame;
use super::{SignalCode, Strategy};
use crate::error::Result;
use crate::indicators::bollinger::Bollinger;
use crate::indicators::kox::Kox;
use crate::indicators::rsi::Rsi;
use crate::indicators::sma::Sma;
use crate::indicators::Indicator;
use crate::market_data::{CandleSeries, Source};

/// Informational multi-indicator dashboard.
#[derive(Debug)]
pub struct DashboardStrategy {
    fast_sma: usize,
    mid_sma: usize,
    slow_sma: usize,
    rsi_period: usize,
    bb_period: usize,
    bb_mult: f64,
    kox: Kox,
    frame: Option<Frame>,
}

impl Default for DashboardStrategy {
    fn default() -> Self {
        Self {
            fast_sma: 50,
            mid_sma: 100,
            slow_sma: 200,
            rsi_period: 14,
            bb_period: 20,
            bb_mult: 2.0,
            kox: Kox::default(),
            frame: None,
        }
    }
}

impl Strategy for DashboardStrategy {
    fn think(&mut self, series: &CandleSeries, response_size: usize) -> Result<SignalCode> {
        let fast = Sma::new(self.fast_sma).calculate(series, response_size, Source::Close)?;
        let mid = Sma::new(self.mid_sma).calculate(series, response_size, Source::Close)?;
        let slow = Sma::new(self.slow_sma).calculate(series, response_size, Source::Close)?;
        let rsi = Rsi::new(self.rsi_period).calculate(series, response_size, Source::Close)?;
        let bb = Bollinger::new(self.bb_period, self.bb_mult).calculate(
            series,
            response_size,
            Source::Close,
        )?;
        let kox = self.kox.calculate(series, response_size, Source::Close)?;

        let frame = Frame::from_result("fast_sma", &fast, &[("sma", "fast_sma")])
            .merge(Frame::from_result("mid_sma", &mid, &[("sma", "mid_sma")]))?
            .merge(Frame::from_result("slow_sma", &slow, &[("sma", "slow_sma")]))?
            .merge(Frame::from_result("rsi", &rsi, &[("rsi", "rsi")]))?
            .merge(Frame::from_result(
                "bollinger",
                &bb,
                &[
                    ("basis", "basis"),
                    ("upper", "upper"),
                    ("lower", "lower"),
                    ("bandwidth", "bandwidth"),
                ],
            ))?
            .merge(Frame::from_result("kox", &kox, &[("roc", "kox")]))?;

        debug!(rows = frame.len(), "dashboard table assembled");
        self.frame = Some(frame);

        // Informational only — see the module note.
        Ok(SignalCode::Neutral)
    }

    fn snapshot(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }
}
