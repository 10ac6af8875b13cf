//! Trading strategies.
//!
//! Strategies are a closed sum type rather than trait objects: the three
//! variants share the same capability surface (decide one action, pick the
//! next pause) and dispatch stays a plain `match`.

mod market_maker;
mod random;
mod trend_follower;

use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use rand::rngs::StdRng;
use types::AgentId;

use crate::portfolio::Portfolio;
use crate::venue::Venue;

pub use market_maker::MarketMaker;
pub use random::RandomTrader;
pub use trend_follower::TrendFollower;

/// Reference price strategies fall back to while the book has not traded
/// yet. Seeding is deliberately a strategy concern, not a book concern.
pub(crate) const FALLBACK_LAST_PRICE: f64 = 100.0;

/// Everything a strategy sees when it takes an action: the venue it trades
/// on and the agent state it acts for. The portfolio mutex is held only
/// while reading constraints and registering the order, never across the
/// submit call.
pub struct AgentCx<'a> {
    pub id: AgentId,
    pub venue: &'a dyn Venue,
    pub portfolio: &'a Mutex<Portfolio>,
    pub rng: &'a mut StdRng,
}

/// A trading strategy: one of the three agent behaviours.
pub enum Strategy {
    /// Coin-flip side and type, price near last, uniform pacing.
    Random(RandomTrader),
    /// Two-sided quotes inside the spread, prunes its own stale orders.
    MarketMaker(MarketMaker),
    /// EMA signal chaser using market orders.
    TrendFollower(TrendFollower),
}

impl Strategy {
    pub fn random() -> Self {
        Strategy::Random(RandomTrader::new())
    }

    /// `delta`: assumed half-spread in price units when one side is empty.
    pub fn market_maker(delta: f64) -> Self {
        Strategy::MarketMaker(MarketMaker::new(delta))
    }

    /// `alpha`: EMA smoothing factor in (0, 1).
    pub fn trend_follower(alpha: f64) -> Self {
        Strategy::TrendFollower(TrendFollower::new(alpha))
    }

    /// Take one action against the venue.
    pub fn act(&mut self, cx: &mut AgentCx<'_>) {
        match self {
            Strategy::Random(s) => s.act(cx),
            Strategy::MarketMaker(s) => s.act(cx),
            Strategy::TrendFollower(s) => s.act(cx),
        }
    }

    /// How long to wait before the next action.
    pub fn pause(&self, rng: &mut StdRng) -> Duration {
        let millis = match self {
            Strategy::Random(_) => rng.random_range(100..1000),
            Strategy::MarketMaker(_) => rng.random_range(500..1000),
            Strategy::TrendFollower(_) => rng.random_range(200..1000),
        };
        Duration::from_millis(millis)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Random(_) => "random",
            Strategy::MarketMaker(_) => "market-maker",
            Strategy::TrendFollower(_) => "trend-follower",
        }
    }
}
