//! Sequential order book state with price-time priority.
//!
//! Each side maps price to a FIFO level. Levels are intrusive doubly-linked
//! lists over a slab arena of order nodes, and a separate id-to-handle index
//! makes cancellation O(1): the handle locates the node, the node unlinks in
//! place. Best-bid/best-ask are cached; the cache is only recomputed from the
//! key set when the level holding the cached extremum disappears.
//!
//! [`BookCore`] is single-threaded by design. Concurrent access goes through
//! the command loop in [`crate::command`].

use std::collections::{BTreeMap, HashMap};

use slab::Slab;
use types::{AgentId, Order, OrderId, OrderSide, Price, Quantity, Trade};

use crate::error::{BookError, Result};
use crate::matching;

/// Stable handle into the order-node arena.
type Handle = usize;

/// One resting order plus its position in the level's FIFO chain.
#[derive(Debug)]
struct OrderNode {
    order: Order,
    /// Resting price, kept here so unlinking never re-derives it.
    price: Price,
    prev: Option<Handle>,
    next: Option<Handle>,
}

/// A price level: FIFO chain of resting orders at a single price.
#[derive(Debug, Default)]
struct Level {
    head: Option<Handle>,
    tail: Option<Handle>,
    order_count: usize,
    total_quantity: Quantity,
}

/// Order book state for a single symbol.
///
/// All mutation happens through [`submit`](BookCore::submit) and
/// [`cancel`](BookCore::cancel); the matching engine drives the finer-grained
/// crate-internal operations.
#[derive(Debug)]
pub struct BookCore {
    symbol: String,
    /// Buy levels; best bid is the highest key.
    bids: BTreeMap<Price, Level>,
    /// Sell levels; best ask is the lowest key.
    asks: BTreeMap<Price, Level>,
    /// Arena of resting order nodes.
    orders: Slab<OrderNode>,
    /// Id lookup for O(1) cancellation.
    index: HashMap<OrderId, Handle>,
    best_bid: Option<Price>,
    best_ask: Option<Price>,
    last_price: Option<Price>,
}

impl BookCore {
    /// Create an empty book.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            orders: Slab::new(),
            index: HashMap::new(),
            best_bid: None,
            best_ask: None,
            last_price: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Validate and match an incoming order, resting any limit remainder.
    ///
    /// Returns the trades produced, in match order. Market-order remainders
    /// are discarded (immediate-or-cancel).
    pub fn submit(&mut self, order: Order) -> Result<Vec<Trade>> {
        matching::execute(self, order)
    }

    /// Remove a resting order by id, returning it.
    pub fn cancel(&mut self, order_id: OrderId) -> Result<Order> {
        let handle = self
            .index
            .get(&order_id)
            .copied()
            .ok_or(BookError::OrderNotFound(order_id))?;
        Ok(self.unlink(handle))
    }

    /// Highest resting buy price, if any bids rest.
    pub fn best_bid(&self) -> Option<Price> {
        self.best_bid
    }

    /// Lowest resting sell price, if any asks rest.
    pub fn best_ask(&self) -> Option<Price> {
        self.best_ask
    }

    /// Price of the most recent trade.
    pub fn last_price(&self) -> Option<Price> {
        self.last_price
    }

    /// Number of resting orders.
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Number of non-empty price levels on one side.
    pub fn level_count(&self, side: OrderSide) -> usize {
        self.levels(side).len()
    }

    /// Total resting quantity at a price, zero if the level does not exist.
    pub fn quantity_at(&self, side: OrderSide, price: Price) -> Quantity {
        self.levels(side)
            .get(&price)
            .map(|level| level.total_quantity)
            .unwrap_or(Quantity::ZERO)
    }

    /// Whether an order id is currently resting.
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn levels(&self, side: OrderSide) -> &BTreeMap<Price, Level> {
        match side {
            OrderSide::Buy => &self.bids,
            OrderSide::Sell => &self.asks,
        }
    }

    /// Best price on a given book side (bids: highest, asks: lowest).
    pub(crate) fn best_price(&self, side: OrderSide) -> Option<Price> {
        match side {
            OrderSide::Buy => self.best_bid,
            OrderSide::Sell => self.best_ask,
        }
    }

    pub(crate) fn set_last_price(&mut self, price: Price) {
        self.last_price = Some(price);
    }

    /// Front of the FIFO queue at the best price of one side.
    pub(crate) fn peek_front(&self, side: OrderSide) -> Option<(AgentId, OrderId, Quantity)> {
        let price = self.best_price(side)?;
        let handle = self.levels(side).get(&price)?.head?;
        let node = &self.orders[handle];
        Some((
            node.order.agent_id,
            node.order.id,
            node.order.remaining_quantity,
        ))
    }

    /// Reduce the front order at the best price of one side by `quantity`,
    /// removing it (and, if emptied, its level) when fully filled.
    pub(crate) fn fill_front(&mut self, side: OrderSide, quantity: Quantity) {
        let Some(price) = self.best_price(side) else {
            return;
        };
        let head = match side {
            OrderSide::Buy => self.bids.get(&price).and_then(|level| level.head),
            OrderSide::Sell => self.asks.get(&price).and_then(|level| level.head),
        };
        let Some(handle) = head else {
            debug_assert!(false, "cached best price points at a missing level");
            return;
        };

        let filled_out = {
            let node = &mut self.orders[handle];
            node.order.remaining_quantity = node.order.remaining_quantity.saturating_sub(quantity);
            node.order.is_filled()
        };

        let level = match side {
            OrderSide::Buy => self.bids.get_mut(&price),
            OrderSide::Sell => self.asks.get_mut(&price),
        };
        if let Some(level) = level {
            level.total_quantity = level.total_quantity.saturating_sub(quantity);
        }

        if filled_out {
            let _ = self.unlink(handle);
        }
    }

    /// Append a limit order to the back of its price level's queue.
    pub(crate) fn rest(&mut self, order: Order) {
        let Some(price) = order.limit_price() else {
            debug_assert!(false, "market orders never rest");
            return;
        };
        let side = order.side;
        let quantity = order.remaining_quantity;
        let order_id = order.id;

        let handle = self.orders.insert(OrderNode {
            order,
            price,
            prev: None,
            next: None,
        });
        self.index.insert(order_id, handle);

        let prev_tail = {
            let level = match side {
                OrderSide::Buy => self.bids.entry(price),
                OrderSide::Sell => self.asks.entry(price),
            }
            .or_default();
            let tail = level.tail;
            if tail.is_none() {
                level.head = Some(handle);
            }
            level.tail = Some(handle);
            level.order_count += 1;
            level.total_quantity += quantity;
            tail
        };
        if let Some(tail) = prev_tail {
            self.orders[tail].next = Some(handle);
            self.orders[handle].prev = Some(tail);
        }

        match side {
            OrderSide::Buy => {
                if self.best_bid.is_none_or(|best| price > best) {
                    self.best_bid = Some(price);
                }
            }
            OrderSide::Sell => {
                if self.best_ask.is_none_or(|best| price < best) {
                    self.best_ask = Some(price);
                }
            }
        }
    }

    /// Remove a node from its level chain, dropping the level when it
    /// empties and recomputing the cached extremum if that level held it.
    fn unlink(&mut self, handle: Handle) -> Order {
        let node = self.orders.remove(handle);
        self.index.remove(&node.order.id);

        if let Some(prev) = node.prev {
            self.orders[prev].next = node.next;
        }
        if let Some(next) = node.next {
            self.orders[next].prev = node.prev;
        }

        let side = node.order.side;
        let emptied = {
            let level = match side {
                OrderSide::Buy => self.bids.get_mut(&node.price),
                OrderSide::Sell => self.asks.get_mut(&node.price),
            };
            let Some(level) = level else {
                debug_assert!(false, "resting order without a level");
                return node.order;
            };
            if level.head == Some(handle) {
                level.head = node.next;
            }
            if level.tail == Some(handle) {
                level.tail = node.prev;
            }
            level.order_count -= 1;
            level.total_quantity = level
                .total_quantity
                .saturating_sub(node.order.remaining_quantity);
            level.order_count == 0
        };

        if emptied {
            match side {
                OrderSide::Buy => {
                    self.bids.remove(&node.price);
                    if self.best_bid == Some(node.price) {
                        self.best_bid = self.bids.keys().next_back().copied();
                    }
                }
                OrderSide::Sell => {
                    self.asks.remove(&node.price);
                    if self.best_ask == Some(node.price) {
                        self.best_ask = self.asks.keys().next().copied();
                    }
                }
            }
        }

        node.order
    }

    /// Check every structural invariant, panicking on violation.
    ///
    /// Walked by the property tests after each command; cheap enough for
    /// test-sized books, not meant for the hot path.
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let mut seen = 0usize;
        for (side, levels) in [(OrderSide::Buy, &self.bids), (OrderSide::Sell, &self.asks)] {
            for (&price, level) in levels {
                assert!(level.order_count > 0, "empty level at {price} survived");
                let mut chain = 0usize;
                let mut total = Quantity::ZERO;
                let mut cursor = level.head;
                let mut prev: Option<Handle> = None;
                while let Some(handle) = cursor {
                    let node = &self.orders[handle];
                    assert_eq!(node.price, price, "node filed under the wrong level");
                    assert_eq!(node.order.side, side, "node filed under the wrong side");
                    assert!(
                        !node.order.remaining_quantity.is_zero(),
                        "resting order with zero remaining quantity"
                    );
                    assert_eq!(node.prev, prev, "broken back-link in level chain");
                    assert_eq!(
                        self.index.get(&node.order.id),
                        Some(&handle),
                        "index does not point at the resting node"
                    );
                    total += node.order.remaining_quantity;
                    chain += 1;
                    prev = Some(handle);
                    cursor = node.next;
                }
                assert_eq!(level.tail, prev, "level tail out of sync");
                assert_eq!(chain, level.order_count, "level order count out of sync");
                assert_eq!(
                    total, level.total_quantity,
                    "level total quantity out of sync"
                );
                seen += chain;
            }
        }
        assert_eq!(seen, self.index.len(), "index size != resting orders");
        assert_eq!(seen, self.orders.len(), "arena size != resting orders");
        assert_eq!(
            self.best_bid,
            self.bids.keys().next_back().copied(),
            "cached best bid != keyset maximum"
        );
        assert_eq!(
            self.best_ask,
            self.asks.keys().next().copied(),
            "cached best ask != keyset minimum"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Price;

    fn limit(id: u64, agent: u64, side: OrderSide, price: f64, qty: u64) -> Order {
        let mut order = Order::limit(
            AgentId(agent),
            "GOOG",
            side,
            Price::from_float(price),
            Quantity(qty),
        );
        order.id = OrderId(id);
        order
    }

    #[test]
    fn new_book_is_empty() {
        let book = BookCore::new("GOOG");
        assert_eq!(book.symbol(), "GOOG");
        assert!(book.is_empty());
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.last_price(), None);
    }

    #[test]
    fn resting_updates_best_prices() {
        let mut book = BookCore::new("GOOG");
        book.submit(limit(1, 1, OrderSide::Buy, 99.0, 5)).unwrap();
        assert_eq!(book.best_bid(), Some(Price::from_float(99.0)));

        book.submit(limit(2, 2, OrderSide::Sell, 101.0, 5)).unwrap();
        assert_eq!(book.best_ask(), Some(Price::from_float(101.0)));

        // A higher bid between the quotes becomes the new best without
        // matching.
        book.submit(limit(3, 3, OrderSide::Buy, 100.0, 3)).unwrap();
        assert_eq!(book.best_bid(), Some(Price::from_float(100.0)));
        book.assert_invariants();
    }

    #[test]
    fn cancel_removes_order_and_level() {
        let mut book = BookCore::new("GOOG");
        book.submit(limit(1, 1, OrderSide::Sell, 100.0, 10)).unwrap();
        assert_eq!(book.level_count(OrderSide::Sell), 1);

        let cancelled = book.cancel(OrderId(1)).unwrap();
        assert_eq!(cancelled.id, OrderId(1));
        assert_eq!(cancelled.remaining_quantity, Quantity(10));
        assert!(book.is_empty());
        assert_eq!(book.level_count(OrderSide::Sell), 0);
        assert_eq!(book.best_ask(), None);
        book.assert_invariants();
    }

    #[test]
    fn cancel_unknown_order_fails() {
        let mut book = BookCore::new("GOOG");
        assert_eq!(
            book.cancel(OrderId(999)),
            Err(BookError::OrderNotFound(OrderId(999)))
        );
    }

    #[test]
    fn cancel_is_idempotent_in_effect() {
        let mut book = BookCore::new("GOOG");
        book.submit(limit(1, 1, OrderSide::Buy, 99.0, 5)).unwrap();
        assert!(book.cancel(OrderId(1)).is_ok());
        assert_eq!(
            book.cancel(OrderId(1)),
            Err(BookError::OrderNotFound(OrderId(1)))
        );
    }

    #[test]
    fn cancel_of_best_recomputes_extremum() {
        let mut book = BookCore::new("GOOG");
        book.submit(limit(1, 1, OrderSide::Buy, 99.0, 5)).unwrap();
        book.submit(limit(2, 2, OrderSide::Sell, 101.0, 5)).unwrap();
        book.submit(limit(3, 3, OrderSide::Buy, 100.0, 3)).unwrap();
        assert_eq!(book.best_bid(), Some(Price::from_float(100.0)));

        // Cancelling a non-best bid leaves the cache untouched.
        assert!(book.cancel(OrderId(1)).is_ok());
        assert_eq!(book.best_bid(), Some(Price::from_float(100.0)));

        // Cancelling the best bid leaves no bids at all.
        assert!(book.cancel(OrderId(3)).is_ok());
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), Some(Price::from_float(101.0)));
        book.assert_invariants();
    }

    #[test]
    fn cancel_middle_of_level_preserves_fifo() {
        let mut book = BookCore::new("GOOG");
        book.submit(limit(1, 1, OrderSide::Sell, 100.0, 10)).unwrap();
        book.submit(limit(2, 2, OrderSide::Sell, 100.0, 20)).unwrap();
        book.submit(limit(3, 3, OrderSide::Sell, 100.0, 30)).unwrap();

        assert!(book.cancel(OrderId(2)).is_ok());
        book.assert_invariants();

        // Remaining queue order is 1 then 3.
        assert_eq!(
            book.peek_front(OrderSide::Sell),
            Some((AgentId(1), OrderId(1), Quantity(10)))
        );
        assert!(book.cancel(OrderId(1)).is_ok());
        assert_eq!(
            book.peek_front(OrderSide::Sell),
            Some((AgentId(3), OrderId(3), Quantity(30)))
        );
    }

    #[test]
    fn quantity_at_tracks_level_totals() {
        let mut book = BookCore::new("GOOG");
        book.submit(limit(1, 1, OrderSide::Buy, 100.0, 50)).unwrap();
        book.submit(limit(2, 2, OrderSide::Buy, 100.0, 25)).unwrap();
        assert_eq!(
            book.quantity_at(OrderSide::Buy, Price::from_float(100.0)),
            Quantity(75)
        );
        assert!(book.cancel(OrderId(1)).is_ok());
        assert_eq!(
            book.quantity_at(OrderSide::Buy, Price::from_float(100.0)),
            Quantity(25)
        );
    }
}
