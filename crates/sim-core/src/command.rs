//! Single-writer command loop and the thread-safe [`Book`] handle.
//!
//! All mutation is funnelled through one consumer thread that owns the
//! [`BookCore`] and applies commands strictly one at a time; the acceptance
//! order of commands is the ground truth for FIFO priority. Submit and
//! cancel are synchronous: the caller blocks until the command has been
//! applied and every emitted trade has been handed to the trade callback.
//!
//! Reads never touch the command loop. After each command the consumer
//! publishes the top-of-book [`Quotes`] under a readers-writer lock, so
//! best-bid/best-ask/last-price reads are wait-free with respect to matching.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::RwLock;
use types::{Order, OrderId, Price, Trade};

use crate::book::BookCore;

/// Callback invoked once per emitted trade, from the command thread, in
/// emission order. Installed once at construction; this is where the
/// simulation hangs its fill dispatcher. Must not call back into the book.
pub type TradeCallback = Box<dyn Fn(&Trade) + Send>;

/// Commands queued ahead of the consumer; callers block on a reply channel,
/// so depth only smooths bursts.
const COMMAND_QUEUE_DEPTH: usize = 1024;

/// Published top-of-book snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quotes {
    /// Highest resting buy price; `None` when no bids rest.
    pub best_bid: Option<Price>,
    /// Lowest resting sell price; `None` when no asks rest.
    pub best_ask: Option<Price>,
    /// Price of the most recent trade; `None` until the first trade.
    pub last_price: Option<Price>,
}

enum Command {
    Submit {
        order: Order,
        reply: Sender<Vec<Trade>>,
    },
    Cancel {
        order_id: OrderId,
        reply: Sender<bool>,
    },
}

/// Thread-safe handle to a single-symbol order book.
///
/// Cheap to clone; every clone talks to the same command loop. The loop
/// thread exits when the last handle is dropped.
#[derive(Clone)]
pub struct Book {
    commands: Sender<Command>,
    quotes: Arc<RwLock<Quotes>>,
    symbol: Arc<str>,
}

impl Book {
    /// Spawn the command loop for `symbol` with a trade callback installed.
    pub fn open(symbol: impl Into<String>, on_trade: TradeCallback) -> Self {
        let symbol: Arc<str> = Arc::from(symbol.into());
        let (commands, queue) = bounded(COMMAND_QUEUE_DEPTH);
        let quotes = Arc::new(RwLock::new(Quotes::default()));

        let core = BookCore::new(symbol.to_string());
        let published = Arc::clone(&quotes);
        thread::spawn(move || run_commands(core, queue, published, on_trade));

        Self {
            commands,
            quotes,
            symbol,
        }
    }

    /// Submit an order, returning the trades it produced (possibly none).
    ///
    /// Blocks until the order has been matched, any remainder rested and all
    /// trades handed to the trade callback. Invalid orders (non-positive
    /// quantity, or limit with non-positive price) return an empty list.
    pub fn submit(&self, order: Order) -> Vec<Trade> {
        let (reply, response) = bounded(1);
        if self.commands.send(Command::Submit { order, reply }).is_err() {
            return Vec::new();
        }
        response.recv().unwrap_or_default()
    }

    /// Cancel a resting order. Returns `true` iff the id was found and
    /// removed; cancelling an unknown id is not an error.
    pub fn cancel(&self, order_id: OrderId) -> bool {
        let (reply, response) = bounded(1);
        if self
            .commands
            .send(Command::Cancel { order_id, reply })
            .is_err()
        {
            return false;
        }
        response.recv().unwrap_or(false)
    }

    /// Highest resting buy price, `None` when no bids rest.
    pub fn best_bid(&self) -> Option<Price> {
        self.quotes.read().best_bid
    }

    /// Lowest resting sell price, `None` when no asks rest.
    pub fn best_ask(&self) -> Option<Price> {
        self.quotes.read().best_ask
    }

    /// Price of the most recent trade, `None` until the first trade.
    pub fn last_price(&self) -> Option<Price> {
        self.quotes.read().last_price
    }

    /// Consistent snapshot of all three published prices.
    pub fn quotes(&self) -> Quotes {
        *self.quotes.read()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

fn run_commands(
    mut core: BookCore,
    queue: Receiver<Command>,
    quotes: Arc<RwLock<Quotes>>,
    on_trade: TradeCallback,
) {
    for command in queue {
        match command {
            Command::Submit { order, reply } => {
                let trades = core.submit(order).unwrap_or_default();
                publish(&core, &quotes);
                for trade in &trades {
                    on_trade(trade);
                }
                let _ = reply.send(trades);
            }
            Command::Cancel { order_id, reply } => {
                let found = core.cancel(order_id).is_ok();
                publish(&core, &quotes);
                let _ = reply.send(found);
            }
        }
    }
}

fn publish(core: &BookCore, quotes: &RwLock<Quotes>) {
    *quotes.write() = Quotes {
        best_bid: core.best_bid(),
        best_ask: core.best_ask(),
        last_price: core.last_price(),
    };
}
