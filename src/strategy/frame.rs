// =============================================================================
// Frame — timestamp-aligned indicator columns
// =============================================================================
//
// Strategies combine several indicator outputs into one per-timestamp table.
// The join is a strict inner join on `mts`: because every indicator trims to
// the same trailing window of the same series, the timestamp sets of any two
// results a strategy merges must be identical.  A mismatch means an
// indicator broke its alignment contract, and the merge fails with
// `BotError::Alignment` rather than silently dropping rows.

use crate::error::{BotError, Result};
use crate::indicators::IndicatorResult;

/// A named table of float columns over a shared timestamp axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    label: String,
    mts: Vec<i64>,
    columns: Vec<(String, Vec<f64>)>,
}

impl Frame {
    /// Build a frame from selected channels of an indicator result.  Each
    /// `(channel, column)` pair picks one channel and names its column;
    /// unlisted channels are dropped.
    pub fn from_result(
        label: impl Into<String>,
        result: &IndicatorResult,
        picks: &[(&str, &str)],
    ) -> Self {
        let mut columns = Vec::with_capacity(picks.len());
        for (channel, column) in picks {
            if let Some(values) = result.channel(channel) {
                columns.push((column.to_string(), values.to_vec()));
            }
        }
        Self {
            label: label.into(),
            mts: result.mts().to_vec(),
            columns,
        }
    }

    /// Inner-join another frame on the timestamp axis.  The two timestamp
    /// sets must be identical; anything else is a composition contract
    /// violation.
    pub fn merge(mut self, other: Frame) -> Result<Frame> {
        if self.mts != other.mts {
            return Err(BotError::Alignment {
                left: self.label,
                right: other.label,
            });
        }
        self.columns.extend(other.columns);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.mts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mts.is_empty()
    }

    pub fn mts(&self) -> &[i64] {
        &self.mts
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Most recent value of a column.
    pub fn last(&self, name: &str) -> Option<f64> {
        self.column(name)?.last().copied()
    }

    /// Value `back` rows before the most recent one (`back = 0` is the last
    /// row).
    pub fn nth_back(&self, name: &str, back: usize) -> Option<f64> {
        let column = self.column(name)?;
        column.get(column.len().checked_sub(back + 1)?).copied()
    }
}
