//! Trading agents for the CDA exchange simulator.
//!
//! An agent is a [`Strategy`] plus runtime state: a [`Portfolio`] guarded by
//! a per-agent mutex, a private rng, and a bounded fill mailbox. The
//! [`TraderAgent::run`] loop alternates strategy-paced sleeps with single
//! actions until cancelled, while a companion thread drains fills into the
//! portfolio.
//!
//! Agents talk to the world through the [`Venue`] trait, implemented by the
//! simulation coordinator.

mod portfolio;
mod runtime;
pub mod strategies;
mod venue;

pub use portfolio::Portfolio;
pub use runtime::{AgentHandle, MAILBOX_CAPACITY, Shutdown, ShutdownSignal, TraderAgent};
pub use strategies::{AgentCx, MarketMaker, RandomTrader, Strategy, TrendFollower};
pub use venue::Venue;
