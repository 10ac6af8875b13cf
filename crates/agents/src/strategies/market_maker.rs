//! Market maker: quotes both sides just inside the current spread.
//!
//! Each action posts a bid slightly above the best bid and an ask slightly
//! below the best ask, earning the spread when both fill. When either side
//! of the book is empty the maker assumes a spread of `delta` around the
//! last price and seeds it. The open-order set is pruned one order per
//! action once it grows past [`MAX_OPEN_ORDERS`].

use rand::Rng;
use types::{Order, OrderSide, Price, Quantity};

use super::{AgentCx, FALLBACK_LAST_PRICE};

/// Open orders tolerated before pruning kicks in.
const MAX_OPEN_ORDERS: usize = 5;

/// Base quote size; the actual size is this plus up to 4 extra.
const BASE_QUOTE_SIZE: u64 = 5;

/// Maximum random improvement over the touch, in price units.
const IMPROVEMENT: f64 = 0.1;

pub struct MarketMaker {
    /// Assumed half-spread in price units when a side has no quotes.
    delta: f64,
}

impl MarketMaker {
    pub fn new(delta: f64) -> Self {
        Self { delta }
    }

    pub(crate) fn act(&mut self, cx: &mut AgentCx<'_>) {
        let book = cx.venue.book();

        // Prune one stale quote per action. The cancel goes out after the
        // portfolio lock is released; a fill may have beaten us to the id,
        // in which case the cancel is a no-op returning false.
        let stale = {
            let mut portfolio = cx.portfolio.lock();
            if portfolio.open_order_count() > MAX_OPEN_ORDERS {
                let id = portfolio.any_open_order();
                if let Some(id) = id {
                    portfolio.untrack(id);
                }
                id
            } else {
                None
            }
        };
        if let Some(order_id) = stale {
            book.cancel(order_id);
        }

        let last = book
            .last_price()
            .map(Price::to_float)
            .unwrap_or(FALLBACK_LAST_PRICE);
        let best_bid = book
            .best_bid()
            .map(Price::to_float)
            .unwrap_or(last - self.delta);
        let best_ask = book
            .best_ask()
            .map(Price::to_float)
            .unwrap_or(last + self.delta);

        let buy_price = best_bid + cx.rng.random_range(0.0..IMPROVEMENT);
        let mut sell_price = best_ask - cx.rng.random_range(0.0..IMPROVEMENT);
        if sell_price <= buy_price {
            sell_price = buy_price + 0.1;
        }
        let qty = BASE_QUOTE_SIZE + cx.rng.random_range(0..BASE_QUOTE_SIZE);

        let mut orders = Vec::with_capacity(2);
        {
            let mut portfolio = cx.portfolio.lock();

            let buy_price = Price::from_float(buy_price);
            if buy_price * Quantity(qty) <= portfolio.cash() {
                let order = Order::limit(
                    cx.id,
                    cx.venue.symbol(),
                    OrderSide::Buy,
                    buy_price,
                    Quantity(qty),
                );
                portfolio.track(order.id, order.quantity);
                orders.push(order);
            }

            let sell_qty = qty.min(portfolio.position().max(0) as u64);
            if sell_qty >= 1 {
                let order = Order::limit(
                    cx.id,
                    cx.venue.symbol(),
                    OrderSide::Sell,
                    Price::from_float(sell_price),
                    Quantity(sell_qty),
                );
                portfolio.track(order.id, order.quantity);
                orders.push(order);
            }
        }

        for order in orders {
            book.submit(order);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestVenue;
    use super::*;
    use parking_lot::Mutex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use types::{AgentId, Cash};

    use crate::portfolio::Portfolio;
    use crate::venue::Venue;

    fn act_once(portfolio: Portfolio, seed: u64) -> (TestVenue, Mutex<Portfolio>) {
        let venue = TestVenue::new();
        let portfolio = Mutex::new(portfolio);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut maker = MarketMaker::new(1.0);
        maker.act(&mut AgentCx {
            id: AgentId(1),
            venue: &venue,
            portfolio: &portfolio,
            rng: &mut rng,
        });
        (venue, portfolio)
    }

    #[test]
    fn seeds_both_sides_of_an_empty_book() {
        for seed in 0..16 {
            let (venue, portfolio) =
                act_once(Portfolio::new(Cash::from_float(100_000.0), 100), seed);

            // Fallback last price 100 and delta 1: bid lands in [99, 99.1),
            // ask in (100.9, 101].
            let bid = venue.book().best_bid().unwrap();
            let ask = venue.book().best_ask().unwrap();
            assert!(bid >= Price::from_float(99.0) && bid < Price::from_float(99.2));
            assert!(ask > Price::from_float(100.8) && ask <= Price::from_float(101.0));
            assert!(bid < ask);
            assert_eq!(portfolio.lock().open_order_count(), 2);
        }
    }

    #[test]
    fn skips_buy_without_cash_and_sell_without_inventory() {
        for seed in 0..16 {
            let (venue, portfolio) = act_once(Portfolio::new(Cash::ZERO, 0), seed);
            assert_eq!(venue.book().best_bid(), None);
            assert_eq!(venue.book().best_ask(), None);
            assert_eq!(portfolio.lock().open_order_count(), 0);
        }
    }

    #[test]
    fn sell_size_is_clamped_by_inventory() {
        for seed in 0..16 {
            let (venue, portfolio) = act_once(Portfolio::new(Cash::from_float(100_000.0), 2), seed);
            assert!(venue.book().best_ask().is_some(), "ask should rest");

            // Two open quotes: the bid at the rolled size (5..=9) and the
            // sell clamped to the 2 shares held.
            let portfolio = portfolio.lock();
            assert_eq!(portfolio.open_order_count(), 2);
            let mut sizes: Vec<u64> = portfolio.open_orders().map(|(_, q)| q.raw()).collect();
            sizes.sort_unstable();
            assert_eq!(sizes[0], 2);
            assert!((5..=9).contains(&sizes[1]));
        }
    }

    #[test]
    fn prunes_one_open_order_when_over_the_cap() {
        let venue = TestVenue::new();
        let portfolio = Mutex::new(Portfolio::new(Cash::from_float(100_000.0), 100));
        let mut rng = StdRng::seed_from_u64(3);
        let mut maker = MarketMaker::new(1.0);

        // Three actions leave six tracked quotes, over the cap of five.
        for _ in 0..3 {
            maker.act(&mut AgentCx {
                id: AgentId(1),
                venue: &venue,
                portfolio: &portfolio,
                rng: &mut rng,
            });
        }
        assert_eq!(portfolio.lock().open_order_count(), 6);

        // The next action prunes exactly one before posting two more.
        maker.act(&mut AgentCx {
            id: AgentId(1),
            venue: &venue,
            portfolio: &portfolio,
            rng: &mut rng,
        });
        assert_eq!(portfolio.lock().open_order_count(), 7);
    }
}
