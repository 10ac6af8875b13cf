//! CDA exchange simulator driver.
//!
//! Wires the pieces together: one [`Simulation`] (book + dispatcher +
//! registry), one thread per agent running its strategy loop, a periodic
//! status task, and a wall-clock deadline that triggers shutdown.

mod config;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use agents::{Shutdown, ShutdownSignal, Strategy, TraderAgent, Venue};
use clap::Parser;
use crossbeam_channel::{select, tick};
use simulation::Simulation;
use tracing::info;

use crate::config::RunConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = RunConfig::parse();
    info!(
        random = config.random,
        mm = config.mm,
        trend = config.trend,
        dur_secs = config.dur,
        symbol = %config.symbol,
        "starting simulation"
    );

    let sim = Arc::new(Simulation::new(config.symbol.clone()));
    let (shutdown, signal) = Shutdown::new();
    let started = Instant::now();

    let fleet = spawn_fleet(&config, &sim, &signal);
    info!(agents = fleet.len(), "fleet launched, one thread per agent");

    let status = spawn_status_task(&config, &sim, &signal, started);

    // Wall-clock deadline, then cancel the whole run.
    thread::sleep(Duration::from_secs(config.dur));
    shutdown.trigger();

    for worker in fleet {
        let _ = worker.join();
    }
    if let Some(status) = status {
        let _ = status.join();
    }

    // Action loops are done; close the mailboxes so fill consumers drain
    // and terminate.
    sim.shutdown();

    let elapsed = started.elapsed().as_secs_f64();
    let trades = sim.trade_count();
    info!(
        trades,
        elapsed_secs = elapsed,
        trades_per_sec = trades as f64 / elapsed.max(f64::EPSILON),
        last_price = sim.book().last_price().map(|p| p.to_float()),
        "simulation complete"
    );
}

/// Spawn every agent on its own thread, registered with the simulation
/// before its first action.
fn spawn_fleet(
    config: &RunConfig,
    sim: &Arc<Simulation>,
    signal: &ShutdownSignal,
) -> Vec<thread::JoinHandle<()>> {
    let cash = config.starting_cash();
    let inventory = config.inventory;

    let strategies = std::iter::empty()
        .chain((0..config.random).map(|_| Strategy::random()))
        .chain((0..config.mm).map(|_| Strategy::market_maker(config.mm_delta)))
        .chain((0..config.trend).map(|_| Strategy::trend_follower(config.trend_alpha)));

    strategies
        .enumerate()
        .map(|(i, strategy)| {
            let (agent, handle) =
                TraderAgent::new(types::AgentId(i as u64 + 1), strategy, cash, inventory);
            sim.add_agent(handle);
            let signal = signal.clone();
            let venue: Arc<dyn Venue> = Arc::clone(sim) as Arc<dyn Venue>;
            thread::spawn(move || agent.run(signal, venue))
        })
        .collect()
}

/// Periodic status line until shutdown. Returns `None` when disabled.
fn spawn_status_task(
    config: &RunConfig,
    sim: &Arc<Simulation>,
    signal: &ShutdownSignal,
    started: Instant,
) -> Option<thread::JoinHandle<()>> {
    if config.status_every == 0 {
        return None;
    }
    let sim = Arc::clone(sim);
    let signal = signal.clone();
    let period = Duration::from_secs(config.status_every);

    Some(thread::spawn(move || {
        let ticker = tick(period);
        loop {
            select! {
                recv(signal.channel()) -> _ => return,
                recv(ticker) -> _ => {
                    let quotes = sim.book().quotes();
                    info!(
                        elapsed_secs = started.elapsed().as_secs(),
                        trades = sim.trade_count(),
                        best_bid = quotes.best_bid.map(|p| p.to_float()),
                        best_ask = quotes.best_ask.map(|p| p.to_float()),
                        last = quotes.last_price.map(|p| p.to_float()),
                        "status"
                    );
                }
            }
        }
    }))
}
