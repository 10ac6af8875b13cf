//! Random trader: coin-flip side and order type, priced near the last trade.
//!
//! Keeps the market moving. Every action is one order: uniformly buy or
//! sell, uniformly limit or market; limit prices land within ±10 of the last
//! trade price. Quantities are capped by inventory when selling and by cash
//! at the last price when buying.

use rand::Rng;
use types::{Order, OrderSide, Price, Quantity};

use super::{AgentCx, FALLBACK_LAST_PRICE};

/// Largest quantity a random trader asks for in one order.
const MAX_QUANTITY: u64 = 10;

/// Half-width of the limit price band around the last price.
const PRICE_BAND: f64 = 10.0;

pub struct RandomTrader;

impl RandomTrader {
    pub fn new() -> Self {
        RandomTrader
    }

    pub(crate) fn act(&mut self, cx: &mut AgentCx<'_>) {
        let book = cx.venue.book();
        let last = book
            .last_price()
            .unwrap_or(Price::from_float(FALLBACK_LAST_PRICE));

        let is_buy = cx.rng.random_bool(0.5);
        let side = if is_buy {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };
        let is_limit = cx.rng.random_bool(0.5);

        let mut portfolio = cx.portfolio.lock();
        if !is_buy && portfolio.position() < 1 {
            return;
        }

        let mut qty = 1 + cx.rng.random_range(0..MAX_QUANTITY);
        if !is_buy {
            qty = qty.min(portfolio.position() as u64);
        }
        if is_buy && last * Quantity(qty) > portfolio.cash() {
            qty = portfolio.max_affordable(last);
            if qty < 1 {
                return;
            }
        }

        let order = if is_limit {
            let offset = cx.rng.random_range(-PRICE_BAND..PRICE_BAND);
            let price = Price::from_float((last.to_float() + offset).max(1.0));
            Order::limit(cx.id, cx.venue.symbol(), side, price, Quantity(qty))
        } else {
            Order::market(cx.id, cx.venue.symbol(), side, Quantity(qty))
        };

        portfolio.track(order.id, order.quantity);
        drop(portfolio);
        book.submit(order);
    }
}

impl Default for RandomTrader {
    fn default() -> Self {
        Self::new()
    }
}
