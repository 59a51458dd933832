// =============================================================================
// Paper-trading collaborators
// =============================================================================
//
// In-process stand-ins for the two exchange traits so the engine can run end
// to end with no network: `SyntheticMarket` replays a deterministic
// drift-plus-sine price walk, one new bar per candle fetch, and `PaperVenue`
// keeps a netted margin position with realized profit folded back into the
// balance.

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::exchange::{Balance, MarketData, OrderAck, OrderSide, OrderType, Position, TradingVenue};
use crate::market_data::{Candle, Ticker};

// ---------------------------------------------------------------------------
// SyntheticMarket
// ---------------------------------------------------------------------------

const BAR_MILLIS: i64 = 60_000;

/// Deterministic price feed: a linear drift with a sine swing on top.  Every
/// candle fetch advances the walk by one bar, so consecutive cycles see a
/// moving market.
pub struct SyntheticMarket {
    base_price: f64,
    drift: f64,
    amplitude: f64,
    wavelength: f64,
    epoch_ms: i64,
    head: Mutex<u64>,
}

impl SyntheticMarket {
    pub fn new(base_price: f64, drift: f64, amplitude: f64, wavelength: f64) -> Self {
        Self {
            base_price,
            drift,
            amplitude,
            wavelength,
            epoch_ms: Utc::now().timestamp_millis(),
            head: Mutex::new(0),
        }
    }

    fn price_at(&self, index: u64) -> f64 {
        let i = index as f64;
        self.base_price + self.drift * i + self.amplitude * (i / self.wavelength).sin()
    }

    fn candle_at(&self, index: u64) -> Candle {
        let close = self.price_at(index);
        let open = if index == 0 {
            close
        } else {
            self.price_at(index - 1)
        };
        Candle {
            mts: self.epoch_ms + index as i64 * BAR_MILLIS,
            open,
            close,
            high: open.max(close) * 1.001,
            low: open.min(close) * 0.999,
            volume: 100.0 + 10.0 * ((index % 7) as f64),
        }
    }
}

impl Default for SyntheticMarket {
    fn default() -> Self {
        Self::new(30_000.0, 2.0, 450.0, 40.0)
    }
}

impl MarketData for SyntheticMarket {
    fn fetch_candles(&self, _: &str, _: &str, count: usize) -> Result<Vec<Candle>> {
        let mut head = self.head.lock();
        let start = *head;
        let candles = (start..start + count as u64)
            .map(|i| self.candle_at(i))
            .collect();
        *head += 1;
        Ok(candles)
    }

    fn fetch_ticker(&self, _: &str) -> Result<Ticker> {
        let head = *self.head.lock();
        let last_price = self.price_at(head);
        Ok(Ticker {
            bid: last_price * 0.9995,
            ask: last_price * 1.0005,
            last_price,
            daily_volume: 2_500.0,
            high: last_price * 1.02,
            low: last_price * 0.98,
        })
    }
}

// ---------------------------------------------------------------------------
// PaperVenue
// ---------------------------------------------------------------------------

struct PaperAccount {
    balance: Balance,
    position: Option<Position>,
}

/// Margin account simulator.  Orders net against the open position; a fill
/// that crosses through zero flips the position at the fill price, and every
/// closed amount realizes its profit into the balance.
pub struct PaperVenue {
    account: RwLock<PaperAccount>,
}

impl PaperVenue {
    pub fn new(starting_usd: f64) -> Self {
        Self {
            account: RwLock::new(PaperAccount {
                balance: Balance {
                    total_usd: starting_usd,
                    total_available_usd: starting_usd,
                },
                position: None,
            }),
        }
    }

    #[cfg(test)]
    fn with_position(starting_usd: f64, position: Position) -> Self {
        let venue = Self::new(starting_usd);
        venue.account.write().position = Some(position);
        venue
    }

    /// Revalue the open position at `price` and refresh the available
    /// balance.  The engine's host calls this before each cycle.
    pub fn mark(&self, price: f64) {
        let mut account = self.account.write();
        if let Some(p) = account.position.as_mut() {
            p.pl = (price - p.base) * p.amount;
        }
        let committed = account
            .position
            .map(|p| p.base * p.amount.abs())
            .unwrap_or(0.0);
        account.balance.total_available_usd = account.balance.total_usd - committed;
    }

    fn apply_fill(account: &mut PaperAccount, signed_amount: f64, price: f64) {
        let position = account.position.take();
        account.position = match position {
            None => Some(Position {
                base: price,
                amount: signed_amount,
                pl: 0.0,
            }),
            Some(p) if p.amount.signum() == signed_amount.signum() => {
                // Same direction: grow at a volume-weighted entry price.
                let amount = p.amount + signed_amount;
                let base = (p.base * p.amount + price * signed_amount) / amount;
                Some(Position {
                    base,
                    amount,
                    pl: (price - base) * amount,
                })
            }
            Some(p) => {
                let closed = signed_amount.abs().min(p.amount.abs()) * p.amount.signum();
                account.balance.total_usd += (price - p.base) * closed;
                let remaining = p.amount + signed_amount;
                if remaining == 0.0 {
                    None
                } else if remaining.signum() == p.amount.signum() {
                    Some(Position { amount: remaining, ..p })
                } else {
                    // Crossed through zero: the surplus opens fresh.
                    Some(Position {
                        base: price,
                        amount: remaining,
                        pl: 0.0,
                    })
                }
            }
        };
        let committed = account
            .position
            .map(|p| p.base * p.amount.abs())
            .unwrap_or(0.0);
        account.balance.total_available_usd = account.balance.total_usd - committed;
    }
}

impl TradingVenue for PaperVenue {
    fn get_balance(&self) -> Result<Balance> {
        Ok(self.account.read().balance)
    }

    fn get_active_position(&self, _: &str) -> Result<Option<Position>> {
        Ok(self.account.read().position)
    }

    fn submit_order(
        &self,
        trade_pair: &str,
        amount: f64,
        price: f64,
        side: OrderSide,
        _order_type: OrderType,
    ) -> Result<OrderAck> {
        let signed = match side {
            OrderSide::Buy => amount,
            OrderSide::Sell => -amount,
        };
        let mut account = self.account.write();
        Self::apply_fill(&mut account, signed, price);
        info!(%side, amount, price, position = ?account.position, "paper fill");
        Ok(OrderAck {
            id: Uuid::new_v4(),
            trade_pair: trade_pair.to_string(),
            side,
            amount,
            price,
        })
    }
}
