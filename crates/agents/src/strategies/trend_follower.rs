//! Trend follower: chases price momentum with market orders.
//!
//! Maintains an exponentially weighted moving average of the last trade
//! price. When price runs above the average it buys at market; below, it
//! sells at market; at the average it sits out. Aggressive by construction:
//! market orders take whatever liquidity is there.

use rand::Rng;
use types::{Order, OrderSide, Price, Quantity};

use super::{AgentCx, FALLBACK_LAST_PRICE};

/// Largest quantity a trend follower sends in one order.
const MAX_QUANTITY: u64 = 5;

pub struct TrendFollower {
    /// EMA smoothing factor in (0, 1); larger chases faster.
    alpha: f64,
    /// Current moving average of the last trade price.
    ema: f64,
}

impl TrendFollower {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            ema: FALLBACK_LAST_PRICE,
        }
    }

    /// Current moving average (for inspection).
    pub fn ema(&self) -> f64 {
        self.ema
    }

    pub(crate) fn act(&mut self, cx: &mut AgentCx<'_>) {
        let book = cx.venue.book();
        let last = book
            .last_price()
            .map(Price::to_float)
            .unwrap_or(FALLBACK_LAST_PRICE);

        self.ema = self.alpha * last + (1.0 - self.alpha) * self.ema;

        let side = if last > self.ema {
            OrderSide::Buy
        } else if last < self.ema {
            OrderSide::Sell
        } else {
            return;
        };

        let mut portfolio = cx.portfolio.lock();
        if side == OrderSide::Sell && portfolio.position() < 1 {
            return;
        }

        let mut qty = 1 + cx.rng.random_range(0..MAX_QUANTITY);
        if side == OrderSide::Sell {
            qty = qty.min(portfolio.position() as u64);
        }
        if side == OrderSide::Buy {
            let last_price = Price::from_float(last);
            if last_price * Quantity(qty) > portfolio.cash() {
                qty = portfolio.max_affordable(last_price);
                if qty < 1 {
                    return;
                }
            }
        }

        let order = Order::market(cx.id, cx.venue.symbol(), side, Quantity(qty));
        portfolio.track(order.id, order.quantity);
        drop(portfolio);
        book.submit(order);
    }
}
