//! Trades and the fill notifications delivered to counterparties.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, OrderId, Timestamp};
use crate::money::{Cash, Price, Quantity};

/// A completed trade between two orders.
///
/// Emitted by the matching engine in match order. The price is always the
/// resting (passive) order's price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution price.
    pub price: Price,
    /// Number of shares traded.
    pub quantity: Quantity,
    /// Agent on the buy side.
    pub buyer_id: AgentId,
    /// Agent on the sell side.
    pub seller_id: AgentId,
    /// Order on the buy side.
    pub buyer_order_id: OrderId,
    /// Order on the sell side.
    pub seller_order_id: OrderId,
    /// When the trade was emitted (wall clock).
    pub timestamp: Timestamp,
}

impl Trade {
    /// Total cash value of this trade.
    pub fn value(&self) -> Cash {
        self.price * self.quantity
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} shares @ {} (buyer: {}, seller: {})",
            self.quantity, self.price, self.buyer_id, self.seller_id
        )
    }
}

/// One side of a trade, as delivered to the counterparty agent's mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    /// The recipient's order that (partially) filled.
    pub order_id: OrderId,
    /// Execution price.
    pub price: Price,
    /// Filled quantity.
    pub quantity: Quantity,
    /// True when the recipient was the buyer.
    pub is_buy: bool,
}

impl FillEvent {
    /// Cash value of this fill.
    pub fn value(&self) -> Cash {
        self.price * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> Trade {
        Trade {
            price: Price::from_float(100.0),
            quantity: Quantity(5),
            buyer_id: AgentId(2),
            seller_id: AgentId(1),
            buyer_order_id: OrderId(20),
            seller_order_id: OrderId(10),
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn trade_value() {
        assert_eq!(sample_trade().value(), Cash::from_float(500.0));
    }

    #[test]
    fn fill_event_value() {
        let fill = FillEvent {
            order_id: OrderId(10),
            price: Price::from_float(100.0),
            quantity: Quantity(5),
            is_buy: false,
        };
        assert_eq!(fill.value(), Cash::from_float(500.0));
    }

    #[test]
    fn trade_serializes_to_json() {
        let json = serde_json::to_string(&sample_trade()).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample_trade());
    }
}
