//! The simulation coordinator: owns the book, the agent registry and the
//! trade counter, and wires the dispatcher into the book's trade callback.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use agents::{AgentHandle, Venue};
use parking_lot::RwLock;
use sim_core::Book;
use tracing::debug;

use crate::dispatcher::{AgentRegistry, TradeDispatcher};

/// A single-symbol trading venue: one book, many agents.
///
/// Construction opens the book with the trade dispatcher installed as its
/// trade callback, so every emitted trade reaches both counterparties'
/// mailboxes before the submitting call returns.
pub struct Simulation {
    symbol: String,
    book: Book,
    registry: AgentRegistry,
    trades_executed: Arc<AtomicU64>,
}

impl Simulation {
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let registry: AgentRegistry = Arc::new(RwLock::new(HashMap::new()));
        let trades_executed = Arc::new(AtomicU64::new(0));

        let dispatcher =
            TradeDispatcher::new(Arc::clone(&registry), Arc::clone(&trades_executed));
        let book = Book::open(symbol.clone(), Box::new(move |trade| dispatcher.dispatch(trade)));

        Self {
            symbol,
            book,
            registry,
            trades_executed,
        }
    }

    /// Register an agent's fill mailbox. Registration is rare; dispatch
    /// reads the registry far more often than this writes it.
    pub fn add_agent(&self, handle: AgentHandle) {
        debug!(agent = %handle.id, "agent registered");
        self.registry.write().insert(handle.id, handle.fills);
    }

    /// Total trades executed so far.
    pub fn trade_count(&self) -> u64 {
        self.trades_executed.load(Ordering::Relaxed)
    }

    /// Number of currently registered agents.
    pub fn agent_count(&self) -> usize {
        self.registry.read().len()
    }

    /// Close every agent mailbox by dropping the registered senders.
    ///
    /// Call after the action loops have stopped: each fill consumer drains
    /// what is left in its mailbox and terminates.
    pub fn shutdown(&self) {
        debug!("closing agent mailboxes");
        self.registry.write().clear();
    }
}

impl Venue for Simulation {
    fn book(&self) -> &Book {
        &self.book
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }
}
