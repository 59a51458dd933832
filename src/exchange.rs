// =============================================================================
// Exchange collaborator contracts
// =============================================================================
//
// The core never talks HTTP.  Everything it needs from the outside world is
// captured by two synchronous traits: `MarketData` (candles + tickers) and
// `TradingVenue` (balances, positions, orders).  Implementations live at the
// edges — `sim::SyntheticMarket` / `sim::PaperVenue` in-process, real REST
// clients out of tree.  Any transport or parse failure maps to
// `BotError::DataUnavailable`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::market_data::{Candle, Ticker};

// ---------------------------------------------------------------------------
// Venue data types
// ---------------------------------------------------------------------------

/// USD balance snapshot of the margin wallet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Balance {
    pub total_usd: f64,
    pub total_available_usd: f64,
}

/// An open margin position as the venue reports it.
///
/// `amount` is signed: positive = long, negative = short.  `base` is the
/// notional entry price and `pl` the absolute currency profit/loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub base: f64,
    pub amount: f64,
    pub pl: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Margin order types the engine can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
}

/// Acknowledgement returned by the venue for a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    pub id: Uuid,
    pub trade_pair: String,
    pub side: OrderSide,
    pub amount: f64,
    pub price: f64,
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Candle and ticker supply.  `fetch_candles` delivers exactly `count` bars,
/// oldest first; anything less is a `DataUnavailable` failure.
pub trait MarketData: Send + Sync {
    fn fetch_candles(&self, trade_pair: &str, time_frame: &str, count: usize)
        -> Result<Vec<Candle>>;

    fn fetch_ticker(&self, trade_pair: &str) -> Result<Ticker>;
}

/// Order placement and account state.  All calls are blocking from the
/// core's perspective; one evaluation cycle never overlaps another.
pub trait TradingVenue: Send + Sync {
    fn get_balance(&self) -> Result<Balance>;

    fn get_active_position(&self, trade_pair: &str) -> Result<Option<Position>>;

    fn submit_order(
        &self,
        trade_pair: &str,
        amount: f64,
        price: f64,
        side: OrderSide,
        order_type: OrderType,
    ) -> Result<OrderAck>;
}
