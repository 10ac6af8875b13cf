//! Order types: sides, order kinds and the order itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, OrderId, Timestamp, now_millis};
use crate::money::{Price, Quantity};

/// Which side of the market an order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side this order matches against.
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Execution rules for an order.
///
/// Limit orders are good-till-cancelled: any residual after matching rests in
/// the book. Market orders are immediate-or-cancel: any residual is
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Execute at the best available prices, never rests.
    Market,
    /// Execute at the given price or better; the remainder rests.
    Limit { price: Price },
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit { price } => write!(f, "LIMIT@{}", price),
        }
    }
}

/// An order submitted by an agent.
///
/// The matching engine is the only mutator once submitted: it decrements
/// `remaining_quantity` as fills occur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Agent who submitted the order.
    pub agent_id: AgentId,
    /// Symbol being traded.
    pub symbol: String,
    /// Buy or Sell.
    pub side: OrderSide,
    /// Market or Limit.
    pub order_type: OrderType,
    /// Quantity originally submitted.
    pub quantity: Quantity,
    /// Quantity still unfilled.
    pub remaining_quantity: Quantity,
    /// When the order was created (wall clock, informational; queue position
    /// is determined by command acceptance order).
    pub timestamp: Timestamp,
}

impl Order {
    /// Create a new limit order with a freshly minted id.
    pub fn limit(
        agent_id: AgentId,
        symbol: impl Into<String>,
        side: OrderSide,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id: OrderId::next(),
            agent_id,
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit { price },
            quantity,
            remaining_quantity: quantity,
            timestamp: now_millis(),
        }
    }

    /// Create a new market order with a freshly minted id.
    pub fn market(
        agent_id: AgentId,
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Quantity,
    ) -> Self {
        Self {
            id: OrderId::next(),
            agent_id,
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            remaining_quantity: quantity,
            timestamp: now_millis(),
        }
    }

    /// The limit price, if this is a limit order.
    pub fn limit_price(&self) -> Option<Price> {
        match self.order_type {
            OrderType::Limit { price } => Some(price),
            OrderType::Market => None,
        }
    }

    /// Whether the order is fully filled.
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    pub fn is_buy(&self) -> bool {
        self.side == OrderSide::Buy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_order_fields() {
        let o = Order::limit(
            AgentId(1),
            "GOOG",
            OrderSide::Buy,
            Price::from_float(100.0),
            Quantity(10),
        );
        assert_eq!(o.limit_price(), Some(Price::from_float(100.0)));
        assert_eq!(o.remaining_quantity, o.quantity);
        assert!(o.is_buy());
        assert!(!o.is_filled());
        assert!(o.timestamp > 0);
    }

    #[test]
    fn market_order_has_no_limit_price() {
        let o = Order::market(AgentId(1), "GOOG", OrderSide::Sell, Quantity(5));
        assert_eq!(o.limit_price(), None);
        assert!(!o.is_buy());
    }

    #[test]
    fn constructors_mint_distinct_ids() {
        let a = Order::market(AgentId(1), "GOOG", OrderSide::Buy, Quantity(1));
        let b = Order::market(AgentId(1), "GOOG", OrderSide::Buy, Quantity(1));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }
}
