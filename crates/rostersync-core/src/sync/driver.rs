//! Async driver for a [`SyncLoop`].
//!
//! Runs on one task. A tokio interval drives countdown ticks and poll
//! attempts; the fetch itself is spawned so ticks and view signals keep
//! being served while the network is slow. Results come back over a
//! channel carrying their [`PollTicket`], and the engine drops the ones
//! whose generation is no longer current.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::clock::Clock;
use super::sync_loop::{PollTicket, SyncLoop};
use crate::error::FetchError;
use crate::events::Event;
use crate::integrations::{RosterSource, StatusSink};
use crate::roster::{FactionId, Roster};

/// View changes reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSignal {
    /// The roster view was entered. `None` when the faction is unknown.
    Activated { faction_id: Option<FactionId> },
    /// The roster view was left.
    Deactivated,
    /// The host replaced the roster container; rebuild everything.
    RosterReplaced,
    /// Stop the driver.
    Shutdown,
}

type FetchOutcome = (PollTicket, Result<Roster, FetchError>);

/// Drive `engine` until [`ViewSignal::Shutdown`] or the signal channel closes.
///
/// `on_events` receives the events of every step that produced some.
pub async fn run_sync_loop<S, K, C, F>(
    engine: &mut SyncLoop<K>,
    source: Arc<S>,
    mut signals: mpsc::Receiver<ViewSignal>,
    clock: &C,
    mut on_events: F,
) where
    S: RosterSource + ?Sized + 'static,
    K: StatusSink,
    C: Clock,
    F: FnMut(&[Event]),
{
    let (result_tx, mut result_rx) = mpsc::channel::<FetchOutcome>(4);
    let mut ticker = tokio::time::interval(engine.settings().tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            signal = signals.recv() => {
                let now = clock.now();
                match signal {
                    None | Some(ViewSignal::Shutdown) => {
                        engine.deactivate(now);
                        flush_events(engine, &mut on_events);
                        tracing::info!("sync driver stopped");
                        return;
                    }
                    Some(ViewSignal::Activated { faction_id }) => {
                        if let Err(e) = engine.activate(faction_id, now) {
                            tracing::warn!(error = %e, "view not initialized");
                        }
                    }
                    Some(ViewSignal::Deactivated) => engine.deactivate(now),
                    Some(ViewSignal::RosterReplaced) => {
                        if let Err(e) = engine.reinitialize(now) {
                            tracing::debug!(error = %e, "ignoring roster replacement");
                        }
                    }
                }
                dispatch(engine, &source, &result_tx, now);
            }
            Some((ticket, result)) = result_rx.recv() => {
                engine.complete_poll(ticket, result, clock.now());
            }
            _ = ticker.tick() => {
                let now = clock.now();
                engine.tick(now);
                dispatch(engine, &source, &result_tx, now);
            }
        }
        flush_events(engine, &mut on_events);
    }
}

fn dispatch<S, K>(
    engine: &mut SyncLoop<K>,
    source: &Arc<S>,
    results: &mpsc::Sender<FetchOutcome>,
    now: chrono::DateTime<chrono::Utc>,
) where
    S: RosterSource + ?Sized + 'static,
    K: StatusSink,
{
    let Some(ticket) = engine.begin_poll(now) else {
        return;
    };
    tracing::debug!(faction = %ticket.faction_id, generation = ticket.generation, "fetch dispatched");

    let source = Arc::clone(source);
    let results = results.clone();
    tokio::spawn(async move {
        let result = source.fetch_roster(&ticket.faction_id).await;
        // the driver is gone once the receiver is closed
        let _ = results.send((ticket, result)).await;
    });
}

fn flush_events<K: StatusSink>(engine: &mut SyncLoop<K>, on_events: &mut impl FnMut(&[Event])) {
    let events = engine.drain_events();
    if !events.is_empty() {
        on_events(&events);
    }
}
