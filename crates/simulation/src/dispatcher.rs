//! Trade fan-out: one trade in, two fill notifications out.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Sender;
use parking_lot::RwLock;
use tracing::trace;
use types::{AgentId, FillEvent, Trade};

/// Shared registry of agent fill mailboxes.
pub(crate) type AgentRegistry = Arc<RwLock<HashMap<AgentId, Sender<FillEvent>>>>;

/// Routes each emitted trade to its two counterparties and bumps the global
/// trade counter.
///
/// Runs on the book's command thread via the trade callback. Senders are
/// cloned out of the registry before any send, so a full mailbox
/// (backpressure) never blocks other readers of the registry. A send into a
/// disconnected mailbox (the agent is gone) is dropped silently; the counter
/// still advances.
pub(crate) struct TradeDispatcher {
    registry: AgentRegistry,
    trades_executed: Arc<AtomicU64>,
}

impl TradeDispatcher {
    pub(crate) fn new(registry: AgentRegistry, trades_executed: Arc<AtomicU64>) -> Self {
        Self {
            registry,
            trades_executed,
        }
    }

    pub(crate) fn dispatch(&self, trade: &Trade) {
        let (buyer, seller) = {
            let registry = self.registry.read();
            (
                registry.get(&trade.buyer_id).cloned(),
                registry.get(&trade.seller_id).cloned(),
            )
        };

        if let Some(mailbox) = buyer {
            let _ = mailbox.send(FillEvent {
                order_id: trade.buyer_order_id,
                price: trade.price,
                quantity: trade.quantity,
                is_buy: true,
            });
        }
        if let Some(mailbox) = seller {
            let _ = mailbox.send(FillEvent {
                order_id: trade.seller_order_id,
                price: trade.price,
                quantity: trade.quantity,
                is_buy: false,
            });
        }

        self.trades_executed.fetch_add(1, Ordering::Relaxed);
        trace!(
            price = trade.price.to_float(),
            quantity = trade.quantity.raw(),
            buyer = %trade.buyer_id,
            seller = %trade.seller_id,
            "trade dispatched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use types::{OrderId, Price, Quantity};

    fn trade(buyer: u64, seller: u64) -> Trade {
        Trade {
            price: Price::from_float(100.0),
            quantity: Quantity(5),
            buyer_id: AgentId(buyer),
            seller_id: AgentId(seller),
            buyer_order_id: OrderId(20),
            seller_order_id: OrderId(10),
            timestamp: 0,
        }
    }

    #[test]
    fn both_counterparties_receive_their_side() {
        let registry: AgentRegistry = Arc::new(RwLock::new(HashMap::new()));
        let counter = Arc::new(AtomicU64::new(0));
        let (buy_tx, buy_rx) = bounded(8);
        let (sell_tx, sell_rx) = bounded(8);
        registry.write().insert(AgentId(2), buy_tx);
        registry.write().insert(AgentId(1), sell_tx);

        let dispatcher = TradeDispatcher::new(Arc::clone(&registry), Arc::clone(&counter));
        dispatcher.dispatch(&trade(2, 1));

        let buyer_fill = buy_rx.try_recv().unwrap();
        assert!(buyer_fill.is_buy);
        assert_eq!(buyer_fill.order_id, OrderId(20));
        assert_eq!(buyer_fill.quantity, Quantity(5));

        let seller_fill = sell_rx.try_recv().unwrap();
        assert!(!seller_fill.is_buy);
        assert_eq!(seller_fill.order_id, OrderId(10));

        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unknown_or_dead_agents_do_not_stall_the_counter() {
        let registry: AgentRegistry = Arc::new(RwLock::new(HashMap::new()));
        let counter = Arc::new(AtomicU64::new(0));

        // Seller registered but its consumer is gone (receiver dropped).
        let (sell_tx, sell_rx) = bounded(8);
        drop(sell_rx);
        registry.write().insert(AgentId(1), sell_tx);

        let dispatcher = TradeDispatcher::new(registry, Arc::clone(&counter));
        dispatcher.dispatch(&trade(2, 1));
        dispatcher.dispatch(&trade(7, 8));

        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }
}
