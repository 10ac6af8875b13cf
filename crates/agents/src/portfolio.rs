//! Per-agent portfolio: cash, inventory and the open-order set.

use std::collections::HashMap;

use types::{Cash, FillEvent, OrderId, Price, Quantity};

/// An agent's trading state.
///
/// Written only by the agent's fill consumer, read by its action loop; the
/// two coordinate through the per-agent mutex in the runtime, so the struct
/// itself stays plain.
///
/// Open orders are tracked with their remaining quantity: a partial fill
/// decrements, and the id leaves the set only once the order is fully
/// filled.
#[derive(Debug)]
pub struct Portfolio {
    cash: Cash,
    /// Inventory in shares. Signed: concurrent fills can briefly take an
    /// agent below flat even though strategies never deliberately oversell.
    position: i64,
    open_orders: HashMap<OrderId, Quantity>,
}

impl Portfolio {
    pub fn new(cash: Cash, position: i64) -> Self {
        Self {
            cash,
            position,
            open_orders: HashMap::new(),
        }
    }

    pub fn cash(&self) -> Cash {
        self.cash
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn open_order_count(&self) -> usize {
        self.open_orders.len()
    }

    /// Remaining quantity of an open order, if still tracked.
    pub fn open_remaining(&self, order_id: OrderId) -> Option<Quantity> {
        self.open_orders.get(&order_id).copied()
    }

    /// An arbitrary open order id, if any.
    pub fn any_open_order(&self) -> Option<OrderId> {
        self.open_orders.keys().next().copied()
    }

    /// All open orders with their remaining quantities, in no particular
    /// order.
    pub fn open_orders(&self) -> impl Iterator<Item = (OrderId, Quantity)> + '_ {
        self.open_orders.iter().map(|(id, qty)| (*id, *qty))
    }

    /// Record a freshly submitted order.
    pub fn track(&mut self, order_id: OrderId, quantity: Quantity) {
        self.open_orders.insert(order_id, quantity);
    }

    /// Forget an open order (on cancel). Returns whether it was tracked.
    pub fn untrack(&mut self, order_id: OrderId) -> bool {
        self.open_orders.remove(&order_id).is_some()
    }

    /// How many shares the current cash balance buys at `price`.
    pub fn max_affordable(&self, price: Price) -> u64 {
        if !price.is_positive() || self.cash.raw() <= 0 {
            return 0;
        }
        (self.cash.raw() / price.raw()) as u64
    }

    /// Apply one fill: move cash against inventory and shrink the open
    /// order's remaining quantity, dropping the id when it reaches zero.
    pub fn apply_fill(&mut self, fill: &FillEvent) {
        let value = fill.value();
        if fill.is_buy {
            self.cash -= value;
            self.position += fill.quantity.raw() as i64;
        } else {
            self.cash += value;
            self.position -= fill.quantity.raw() as i64;
        }

        if let Some(remaining) = self.open_orders.get_mut(&fill.order_id) {
            *remaining = remaining.saturating_sub(fill.quantity);
            if remaining.is_zero() {
                self.open_orders.remove(&fill.order_id);
            }
        }
    }
}
