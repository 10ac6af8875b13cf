//! Identifier and time types for the exchange simulator.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use derive_more::{From, Into};
use serde::{Deserialize, Serialize};

/// Unique identifier for an order.
///
/// Agents mint ids themselves when they construct an order; uniqueness across
/// concurrently running agents comes from a process-global counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, From,
    Into,
)]
pub struct OrderId(pub u64);

static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

impl OrderId {
    /// Mint the next process-unique order id.
    pub fn next() -> Self {
        OrderId(NEXT_ORDER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order#{}", self.0)
    }
}

/// Unique identifier for a trading agent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, From,
    Into,
)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent#{}", self.0)
    }
}

/// Wall clock timestamp in milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Current wall clock time in milliseconds.
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
