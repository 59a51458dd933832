// =============================================================================
// Trading Engine — one evaluation cycle from market read to order placement
// =============================================================================
//
// The engine owns the candle series, the risk state and both strategies, and
// talks to the outside world only through the `MarketData` / `TradingVenue`
// traits.  A cycle is strictly ordered:
//
//   1. Refresh the candle series.
//   2. Read balance, active position and ticker.
//   3. Run both strategies over the most recent half of the series.
//   4. Fold the fresh reads into the risk state.
//   5. Act on the trend signal, then run the profit-target and emergency
//      exit checks against the pre-action position snapshot.
//
// Any failure in steps 1-3 aborts the cycle with the risk state untouched;
// the next tick simply retries.  Exits in step 5 evaluate the position
// snapshot taken in step 2, so a flip and a release can both fire in the
// same cycle.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::exchange::{Balance, MarketData, OrderSide, OrderType, Position, TradingVenue};
use crate::market_data::CandleSeries;
use crate::risk::{classify, PositionClass, RiskState};
use crate::strategy::{DashboardStrategy, SignalCode, Strategy, TrendStrategy};

// ---------------------------------------------------------------------------
// Cycle outcome types
// ---------------------------------------------------------------------------

/// What the engine did with the trend signal this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineAction {
    Hold,
    OpenLongFromFlat,
    OpenLongFromShort,
    OpenShortFromFlat,
    OpenShortFromLong,
    CloseProfit,
    CloseLoss,
}

impl std::fmt::Display for EngineAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold => write!(f, "Waiting for a Signal"),
            Self::OpenLongFromFlat => write!(f, "Build Long Position"),
            Self::OpenLongFromShort => write!(f, "Release Short, Build Long Position"),
            Self::OpenShortFromFlat => write!(f, "Build Short Position"),
            Self::OpenShortFromLong => write!(f, "Release Long, Build Short Position"),
            Self::CloseProfit => write!(f, "Target Achieved, Release Position"),
            Self::CloseLoss => write!(f, "Emergency, Release Position"),
        }
    }
}

/// Latest trend-strategy row quoted in the cycle report.  `ratio_ema` is the
/// EMA spread relative to the larger of the two lanes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrendRow {
    pub fast_ema: f64,
    pub slow_ema: f64,
    pub ratio_ema: f64,
    pub signal: SignalCode,
    pub code: i32,
}

/// Latest dashboard row quoted in the cycle report.  `rsi_change` compares
/// against the reading three rows back.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DashboardRow {
    pub fast_sma: f64,
    pub mid_sma: f64,
    pub slow_sma: f64,
    pub rsi: f64,
    pub rsi_change: f64,
    pub basis: f64,
    pub upper: f64,
    pub lower: f64,
    pub bandwidth: f64,
    pub kox: f64,
}

/// Everything one evaluation cycle observed and decided.
/// `real_available_usd` folds the venue's 3.3x margin multiplier into the
/// spendable figure; the `*_price_perc` fields relate the last price to the
/// session extrema.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub mts: i64,
    pub trade_pair: String,
    pub action: EngineAction,
    pub position_before: PositionClass,
    pub position: Option<Position>,
    pub balance: Balance,
    pub real_available_usd: f64,
    pub bid: f64,
    pub ask: f64,
    pub daily_volume: f64,
    pub risk: RiskState,
    pub peak_price_perc: f64,
    pub bottom_price_perc: f64,
    pub trend: TrendRow,
    pub dashboard: Option<DashboardRow>,
}

// ---------------------------------------------------------------------------
// TradingEngine
// ---------------------------------------------------------------------------

const MAX_LEVERAGE: f64 = 3.3;

pub struct TradingEngine {
    config: BotConfig,
    series: CandleSeries,
    risk: RiskState,
    trend: TrendStrategy,
    dashboard: DashboardStrategy,
    market: Arc<dyn MarketData>,
    venue: Arc<dyn TradingVenue>,
}

impl TradingEngine {
    pub fn new(
        config: BotConfig,
        market: Arc<dyn MarketData>,
        venue: Arc<dyn TradingVenue>,
    ) -> Self {
        let series = CandleSeries::new(
            config.trade_pair.clone(),
            config.time_frame.clone(),
            config.history_size,
        );
        let trend = TrendStrategy::new(config.trend_fast, config.trend_slow);
        Self {
            config,
            series,
            risk: RiskState::default(),
            trend,
            dashboard: DashboardStrategy::default(),
            market,
            venue,
        }
    }

    pub fn risk_state(&self) -> &RiskState {
        &self.risk
    }

    /// Run one full evaluation cycle.
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        // ── 1. Refresh market history ──
        self.series.refresh(self.market.as_ref())?;
        let current_bar = *self.series.last().ok_or_else(|| {
            BotError::DataUnavailable(format!("{} series is empty", self.config.trade_pair))
        })?;

        // ── 2. Read account and quote state ──
        let balance = self.venue.get_balance()?;
        let position = self.venue.get_active_position(&self.config.trade_pair)?;
        let ticker = self.market.fetch_ticker(&self.config.trade_pair)?;

        // ── 3. Strategies over the most recent half of the window ──
        let response_size = self.config.history_size / 2;
        let signal = self.trend.think(&self.series, response_size)?;
        self.dashboard.think(&self.series, response_size)?;

        // ── 4. Fold into the risk state ──
        // Past this point the cycle can no longer fail short of an order
        // rejection, so the session state may absorb the reads.
        self.risk.observe(&ticker, &current_bar, position.as_ref());

        // ── 5. Decide and act ──
        let position_before = classify(position.as_ref());
        let last_price = ticker.last_price;
        let mut action = EngineAction::Hold;

        match signal {
            SignalCode::StrongBuy if position_before != PositionClass::Long => {
                let mut amount =
                    balance.total_available_usd / last_price * self.config.investment_fraction;
                if let Some(p) = position.as_ref() {
                    amount += p.amount.abs();
                }
                self.place(amount, last_price, OrderSide::Buy)?;
                action = if position_before == PositionClass::Short {
                    EngineAction::OpenLongFromShort
                } else {
                    EngineAction::OpenLongFromFlat
                };
            }
            SignalCode::StrongSell if position_before != PositionClass::Short => {
                let mut amount =
                    balance.total_available_usd / last_price * self.config.investment_fraction;
                if let Some(p) = position.as_ref() {
                    amount += p.amount.abs();
                }
                self.place(amount, last_price, OrderSide::Sell)?;
                action = if position_before == PositionClass::Long {
                    EngineAction::OpenShortFromLong
                } else {
                    EngineAction::OpenShortFromFlat
                };
            }
            _ => {}
        }

        if let Some(p) = position.as_ref() {
            let release_side = if p.amount > 0.0 {
                OrderSide::Sell
            } else {
                OrderSide::Buy
            };
            if self.risk.pl_perc >= 2.0 * self.config.tolerance {
                self.place(p.amount.abs(), last_price, release_side)?;
                action = EngineAction::CloseProfit;
            }
            if self.risk.pl_perc <= -self.config.tolerance {
                warn!(
                    pl_perc = self.risk.pl_perc,
                    tolerance = self.config.tolerance,
                    "loss tolerance breached"
                );
                self.place(p.amount.abs(), last_price, release_side)?;
                action = EngineAction::CloseLoss;
            }
        }

        let report = CycleReport {
            mts: current_bar.mts,
            trade_pair: self.config.trade_pair.clone(),
            action,
            position_before,
            position,
            balance,
            real_available_usd: balance.total_usd * (1.0 - MAX_LEVERAGE)
                + balance.total_available_usd * MAX_LEVERAGE,
            bid: ticker.bid,
            ask: ticker.ask,
            daily_volume: ticker.daily_volume,
            risk: self.risk,
            peak_price_perc: if self.risk.peak_price != 0.0 {
                last_price / self.risk.peak_price
            } else {
                0.0
            },
            bottom_price_perc: if self.risk.bottom_price.is_finite()
                && self.risk.bottom_price != 0.0
            {
                last_price / self.risk.bottom_price
            } else {
                0.0
            },
            trend: self.trend_row(signal),
            dashboard: self.dashboard_row(),
        };
        info!(
            action = %report.action,
            signal = %signal,
            position = %report.position_before,
            last_price,
            "cycle complete"
        );
        Ok(report)
    }

    fn place(&mut self, amount: f64, price: f64, side: OrderSide) -> Result<()> {
        let ack = self.venue.submit_order(
            &self.config.trade_pair,
            amount,
            price,
            side,
            OrderType::Market,
        )?;
        info!(order_id = %ack.id, side = %ack.side, amount = ack.amount, price = ack.price, "order executed");
        self.risk.on_order_executed(price);
        Ok(())
    }

    fn trend_row(&self, signal: SignalCode) -> TrendRow {
        let frame = self.trend.snapshot();
        let read = |name: &str| frame.and_then(|f| f.last(name)).unwrap_or(0.0);
        let fast_ema = read("fast_ema");
        let slow_ema = read("slow_ema");
        let reference = if fast_ema > slow_ema { fast_ema } else { slow_ema };
        TrendRow {
            fast_ema,
            slow_ema,
            ratio_ema: if reference != 0.0 {
                (fast_ema - slow_ema) / reference
            } else {
                0.0
            },
            signal,
            code: signal.code(),
        }
    }

    fn dashboard_row(&self) -> Option<DashboardRow> {
        let frame = self.dashboard.snapshot()?;
        let rsi = frame.last("rsi")?;
        Some(DashboardRow {
            fast_sma: frame.last("fast_sma")?,
            mid_sma: frame.last("mid_sma")?,
            slow_sma: frame.last("slow_sma")?,
            rsi,
            rsi_change: rsi - frame.nth_back("rsi", 3).unwrap_or(rsi),
            basis: frame.last("basis")?,
            upper: frame.last("upper")?,
            lower: frame.last("lower")?,
            bandwidth: frame.last("bandwidth")?,
            kox: frame.last("kox")?,
        })
    }
}
