//! Value types shared across the CDA exchange simulator.
//!
//! This crate defines the plain data the rest of the workspace passes
//! around: identifiers, fixed-point money, orders, trades and fill events.
//! Nothing here holds behaviour beyond construction and formatting; the
//! order book is the only mutator of an [`Order`] after submission.

mod ids;
mod money;
mod order;
mod trade;

pub use ids::{AgentId, OrderId, Timestamp, now_millis};
pub use money::{Cash, PRICE_SCALE, Price, Quantity};
pub use order::{Order, OrderSide, OrderType};
pub use trade::{FillEvent, Trade};
