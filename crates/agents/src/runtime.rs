//! Agent runtime: the two cooperating threads behind every trader.
//!
//! Each agent runs an action loop (sleep a strategy-specific interval, take
//! one action) and a fill consumer that drains the agent's bounded mailbox
//! and applies fills to the portfolio. The action loop exits at the next
//! check after the shutdown signal fires; the fill consumer drains and exits
//! once the venue closes the mailbox by dropping its sender.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, after, bounded, select};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use types::{AgentId, Cash, FillEvent};

use crate::portfolio::Portfolio;
use crate::strategies::{AgentCx, Strategy};
use crate::venue::Venue;

/// Fill mailbox depth. A full mailbox blocks the dispatcher (backpressure)
/// until the consumer catches up.
pub const MAILBOX_CAPACITY: usize = 100;

/// The registration half of an agent: its id and the sending side of its
/// fill mailbox. Handed to the venue's registry; dropping the sender is how
/// the venue closes the mailbox at shutdown.
pub struct AgentHandle {
    pub id: AgentId,
    pub fills: Sender<FillEvent>,
}

/// Cancellation trigger shared by a whole run.
///
/// Dropping (or [`trigger`](Shutdown::trigger)-ing) it disconnects every
/// [`ShutdownSignal`] clone at once; nothing is ever sent on the channel.
pub struct Shutdown {
    _alive: Sender<()>,
}

/// The observing half of [`Shutdown`]; clone one per task.
#[derive(Clone)]
pub struct ShutdownSignal {
    alive: Receiver<()>,
}

impl Shutdown {
    pub fn new() -> (Shutdown, ShutdownSignal) {
        let (tx, rx) = bounded(0);
        (Shutdown { _alive: tx }, ShutdownSignal { alive: rx })
    }

    /// Fire the signal, waking every listener.
    pub fn trigger(self) {}
}

impl ShutdownSignal {
    /// Whether the trigger has fired.
    pub fn is_triggered(&self) -> bool {
        use crossbeam_channel::TryRecvError;
        matches!(self.alive.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// The underlying channel, for use in `select!` arms: it becomes ready
    /// (with a disconnect error) exactly when the trigger fires.
    pub fn channel(&self) -> &Receiver<()> {
        &self.alive
    }
}

/// One autonomous trader: strategy, portfolio, rng and fill mailbox.
pub struct TraderAgent {
    id: AgentId,
    strategy: Strategy,
    portfolio: Arc<Mutex<Portfolio>>,
    rng: StdRng,
    mailbox: Receiver<FillEvent>,
}

impl TraderAgent {
    /// Create an agent and the handle to register with the venue.
    pub fn new(
        id: AgentId,
        strategy: Strategy,
        initial_cash: Cash,
        initial_position: i64,
    ) -> (Self, AgentHandle) {
        Self::with_rng(
            id,
            strategy,
            initial_cash,
            initial_position,
            StdRng::from_os_rng(),
        )
    }

    /// Like [`new`](Self::new) but with a fixed seed, for reproducible
    /// tests.
    pub fn with_seed(
        id: AgentId,
        strategy: Strategy,
        initial_cash: Cash,
        initial_position: i64,
        seed: u64,
    ) -> (Self, AgentHandle) {
        Self::with_rng(
            id,
            strategy,
            initial_cash,
            initial_position,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        id: AgentId,
        strategy: Strategy,
        initial_cash: Cash,
        initial_position: i64,
        rng: StdRng,
    ) -> (Self, AgentHandle) {
        let (fills, mailbox) = bounded(MAILBOX_CAPACITY);
        let agent = Self {
            id,
            strategy,
            portfolio: Arc::new(Mutex::new(Portfolio::new(initial_cash, initial_position))),
            rng,
            mailbox,
        };
        (agent, AgentHandle { id, fills })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Shared handle to this agent's portfolio, for observers that want to
    /// read final holdings after the run.
    pub fn portfolio(&self) -> Arc<Mutex<Portfolio>> {
        Arc::clone(&self.portfolio)
    }

    /// Trade until the shutdown signal fires.
    ///
    /// Blocks the calling thread with the action loop and spawns the fill
    /// consumer alongside it. After the loop exits, the consumer keeps
    /// draining until the venue drops this agent's mailbox sender, then
    /// terminates on its own.
    pub fn run(self, shutdown: ShutdownSignal, venue: Arc<dyn Venue>) {
        let TraderAgent {
            id,
            mut strategy,
            portfolio,
            mut rng,
            mailbox,
        } = self;

        let consumer_portfolio = Arc::clone(&portfolio);
        thread::spawn(move || {
            for fill in mailbox {
                consumer_portfolio.lock().apply_fill(&fill);
            }
        });

        loop {
            let pause = strategy.pause(&mut rng);
            select! {
                recv(shutdown.channel()) -> _ => break,
                recv(after(pause)) -> _ => {
                    strategy.act(&mut AgentCx {
                        id,
                        venue: venue.as_ref(),
                        portfolio: &portfolio,
                        rng: &mut rng,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::TestVenue;
    use types::{OrderId, Price, Quantity};

    #[test]
    fn shutdown_signal_fires_on_trigger() {
        let (shutdown, signal) = Shutdown::new();
        let second = signal.clone();
        assert!(!signal.is_triggered());
        assert!(!second.is_triggered());

        shutdown.trigger();
        assert!(signal.is_triggered());
        assert!(second.is_triggered());
    }

    #[test]
    fn fill_consumer_applies_mailbox_events() {
        let (agent, handle) = TraderAgent::with_seed(
            AgentId(1),
            Strategy::random(),
            Cash::from_float(10_000.0),
            100,
            42,
        );
        let portfolio = agent.portfolio();
        {
            portfolio.lock().track(OrderId(1), Quantity(5));
        }

        let (shutdown, signal) = Shutdown::new();
        let venue: Arc<dyn Venue> = Arc::new(TestVenue::new());
        let runner = thread::spawn(move || agent.run(signal, venue));

        handle
            .fills
            .send(FillEvent {
                order_id: OrderId(1),
                price: Price::from_float(100.0),
                quantity: Quantity(5),
                is_buy: false,
            })
            .unwrap();

        shutdown.trigger();
        runner.join().unwrap();
        // Close the mailbox so the consumer finishes applying and exits.
        drop(handle.fills);

        // The consumer may still be finishing its last fill; spin briefly.
        for _ in 0..100 {
            if portfolio.lock().open_order_count() == 0 {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        }

        let portfolio = portfolio.lock();
        assert_eq!(portfolio.cash(), Cash::from_float(10_500.0));
        assert_eq!(portfolio.position(), 95);
        assert_eq!(portfolio.open_order_count(), 0);
    }

    #[test]
    fn run_exits_promptly_on_shutdown() {
        let (agent, _handle) = TraderAgent::with_seed(
            AgentId(2),
            Strategy::trend_follower(0.5),
            Cash::from_float(1_000.0),
            0,
            7,
        );
        let (shutdown, signal) = Shutdown::new();
        let venue: Arc<dyn Venue> = Arc::new(TestVenue::new());

        let runner = thread::spawn(move || agent.run(signal, venue));
        shutdown.trigger();
        runner.join().unwrap();
    }
}
