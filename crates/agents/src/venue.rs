//! The seam between agents and the trading venue they act on.

use sim_core::Book;

/// What an agent needs from the simulation it runs in: the order book and
/// the traded symbol. The coordinator crate implements this; keeping it as a
/// trait here lets agent code (and its tests) run against anything that can
/// hand out a [`Book`].
pub trait Venue: Send + Sync {
    /// The shared order book handle.
    fn book(&self) -> &Book;

    /// The single symbol this venue trades.
    fn symbol(&self) -> &str;
}
