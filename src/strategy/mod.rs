// =============================================================================
// Strategy layer — signal codes and the strategy capability
// =============================================================================
//
// A strategy reduces one or more indicator outputs over a common timestamp
// axis to a discrete signal code, and keeps the merged table around so the
// cycle report can quote its latest row.

pub mod dashboard;
pub mod frame;
pub mod trend;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::market_data::CandleSeries;

pub use dashboard::DashboardStrategy;
pub use frame::Frame;
pub use trend::TrendStrategy;

/// Strength-graded directional recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalCode {
    StrongBuy,
    WeakBuy,
    Neutral,
    WeakSell,
    StrongSell,
}

impl SignalCode {
    /// The wire-level code value.
    pub fn code(self) -> i32 {
        match self {
            Self::StrongBuy => 100,
            Self::WeakBuy => 50,
            Self::Neutral => 0,
            Self::WeakSell => -50,
            Self::StrongSell => -100,
        }
    }
}

impl std::fmt::Display for SignalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "strong-buy"),
            Self::WeakBuy => write!(f, "weak-buy"),
            Self::Neutral => write!(f, "neutral"),
            Self::WeakSell => write!(f, "weak-sell"),
            Self::StrongSell => write!(f, "strong-sell"),
        }
    }
}

/// One composed trading signal: run the indicators over the series, merge
/// their outputs, reduce to a code.  `snapshot` exposes the table merged by
/// the most recent `think` for reporting.
pub trait Strategy: Send {
    fn think(&mut self, series: &CandleSeries, response_size: usize) -> Result<SignalCode>;

    fn snapshot(&self) -> Option<&Frame>;
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_values_match_the_contract() {
        assert_eq!(SignalCode::StrongBuy.code(), 100);
        assert_eq!(SignalCode::WeakBuy.code(), 50);
        assert_eq!(SignalCode::Neutral.code(), 0);
        assert_eq!(SignalCode::WeakSell.code(), -50);
        assert_eq!(SignalCode::StrongSell.code(), -100);
    }
}
