// =============================================================================
// Error taxonomy for the Meridian trading engine
// =============================================================================
//
// Three failure classes cross module boundaries:
//
//   DataUnavailable     — a market-data or venue call could not deliver what
//                         the core asked for.  Never retried inside the core;
//                         the outer loop retries at the next tick.
//   InsufficientHistory — an indicator was asked for more samples than its
//                         warm-up leaves valid.  Raised *before* any partial
//                         output is produced.
//   Alignment           — two indicator outputs handed to a strategy composer
//                         did not share a timestamp set.  Always fatal to the
//                         cycle: it means an indicator broke its contract.
//
// Defined divide-by-zero substitutions (RSI at zero loss, TSI at zero
// denominator, Bollinger bandwidth at zero basis, ...) are resolved inside
// the indicators and never surface as errors.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    /// The external collaborator could not supply the requested data.
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    /// Requested more output samples than the series and warm-up allow.
    #[error("insufficient history: {needed} samples requested, {available} valid")]
    InsufficientHistory { needed: usize, available: usize },

    /// Two joined indicator outputs disagree on their timestamp axis.
    #[error("timestamp alignment mismatch between `{left}` and `{right}`")]
    Alignment { left: String, right: String },
}
