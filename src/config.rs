//! Command-line configuration for a simulation run.

use clap::Parser;
use types::Cash;

/// Continuous double-auction exchange simulator.
///
/// Spawns the requested mix of autonomous agents against a single in-memory
/// order book and runs until the wall-clock deadline.
#[derive(Debug, Clone, Parser)]
#[command(name = "cda-exchange", version, about)]
pub struct RunConfig {
    /// Number of random agents.
    #[arg(long, default_value_t = 50)]
    pub random: usize,

    /// Number of market maker agents.
    #[arg(long, default_value_t = 10)]
    pub mm: usize,

    /// Number of trend follower agents.
    #[arg(long, default_value_t = 50)]
    pub trend: usize,

    /// Run duration in seconds.
    #[arg(long, default_value_t = 30)]
    pub dur: u64,

    /// Symbol to trade.
    #[arg(long, default_value = "GOOG")]
    pub symbol: String,

    /// Starting cash per agent.
    #[arg(long, default_value_t = 100_000.0)]
    pub cash: f64,

    /// Starting inventory (shares) per agent.
    #[arg(long, default_value_t = 100)]
    pub inventory: i64,

    /// Market maker assumed half-spread, in price units.
    #[arg(long, default_value_t = 1.0)]
    pub mm_delta: f64,

    /// Trend follower EMA smoothing factor, in (0, 1).
    #[arg(long, default_value_t = 0.1)]
    pub trend_alpha: f64,

    /// Seconds between status lines (0 disables them).
    #[arg(long, default_value_t = 5)]
    pub status_every: u64,
}

impl RunConfig {
    pub fn total_agents(&self) -> usize {
        self.random + self.mm + self.trend
    }

    pub fn starting_cash(&self) -> Cash {
        Cash::from_float(self.cash)
    }
}
