// =============================================================================
// Bot configuration
// =============================================================================
//
// Every tunable the engine reads lives here.  Values come from an optional
// JSON file with per-field serde defaults, then a handful of environment
// overrides (useful in paper mode and CI).  All fields default so a missing
// or partial file never blocks startup.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_trade_pair() -> String {
    "BTCUSD".to_string()
}

fn default_time_frame() -> String {
    "3h".to_string()
}

fn default_history_size() -> usize {
    500
}

fn default_tick_secs() -> u64 {
    60
}

fn default_tolerance() -> f64 {
    0.02
}

fn default_investment_fraction() -> f64 {
    0.25
}

fn default_trend_fast() -> usize {
    91
}

fn default_trend_slow() -> usize {
    198
}

// =============================================================================
// BotConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Trading pair, e.g. "BTCUSD".
    #[serde(default = "default_trade_pair")]
    pub trade_pair: String,

    /// Candle interval, e.g. "3h".
    #[serde(default = "default_time_frame")]
    pub time_frame: String,

    /// Number of candles held by the series.  Strategies evaluate over half
    /// of this window each cycle.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Seconds between evaluation cycles.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Loss tolerance.  Emergency exit fires at `-tolerance`, the profit
    /// target at `2 * tolerance`.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Fraction of the available balance committed per entry.
    #[serde(default = "default_investment_fraction")]
    pub investment_fraction: f64,

    /// Fast EMA period of the trend-following strategy.
    #[serde(default = "default_trend_fast")]
    pub trend_fast: usize,

    /// Slow EMA period of the trend-following strategy.
    #[serde(default = "default_trend_slow")]
    pub trend_slow: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            trade_pair: default_trade_pair(),
            time_frame: default_time_frame(),
            history_size: default_history_size(),
            tick_secs: default_tick_secs(),
            tolerance: default_tolerance(),
            investment_fraction: default_investment_fraction(),
            trend_fast: default_trend_fast(),
            trend_slow: default_trend_slow(),
        }
    }
}

impl BotConfig {
    /// Load config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Apply `MERIDIAN_*` environment overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(pair) = std::env::var("MERIDIAN_TRADE_PAIR") {
            let pair = pair.trim().to_uppercase();
            if !pair.is_empty() {
                self.trade_pair = pair;
            }
        }
        if let Ok(frame) = std::env::var("MERIDIAN_TIME_FRAME") {
            let frame = frame.trim().to_string();
            if !frame.is_empty() {
                self.time_frame = frame;
            }
        }
        if let Ok(secs) = std::env::var("MERIDIAN_TICK_SECS") {
            if let Ok(secs) = secs.trim().parse() {
                self.tick_secs = secs;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_parameters() {
        let config = BotConfig::default();
        assert_eq!(config.trade_pair, "BTCUSD");
        assert_eq!(config.history_size, 500);
        assert!((config.tolerance - 0.02).abs() < 1e-12);
        assert!((config.investment_fraction - 0.25).abs() < 1e-12);
        assert_eq!(config.trend_fast, 91);
        assert_eq!(config.trend_slow, 198);
    }

    #[test]
    fn partial_json_fills_missing_fields() {
        let config: BotConfig = serde_json::from_str(r#"{"trade_pair": "ETHUSD"}"#).unwrap();
        assert_eq!(config.trade_pair, "ETHUSD");
        assert_eq!(config.history_size, 500);
        assert_eq!(config.tick_secs, 60);
    }
}
