//! Simulation coordinator for the CDA exchange simulator.
//!
//! [`Simulation`] owns the order book, the agent registry and the global
//! trade counter. The book's trade callback is the dispatcher: for every
//! trade it delivers a fill event to each counterparty's mailbox (blocking
//! on a full mailbox, which is backpressure, not loss) and increments the
//! counter.

mod coordinator;
mod dispatcher;

pub use coordinator::Simulation;
