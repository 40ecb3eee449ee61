//! Async driver scenarios on paused tokio time.

mod common;

use async_trait::async_trait;
use common::{at, faction, hospital, okay, roster, RecordingSink};
use rostersync_core::{
    run_sync_loop, Event, FactionId, FetchError, MemberId, Roster, RosterSource, SyncLoop,
    SyncSettings, TokioClock, ViewSignal,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Source that answers after `delay` and counts calls.
struct SlowSource {
    roster: Roster,
    delay: Duration,
    calls: AtomicUsize,
}

impl SlowSource {
    fn new(roster: Roster, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            roster,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterSource for SlowSource {
    async fn fetch_roster(&self, _faction_id: &FactionId) -> Result<Roster, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.roster.clone())
    }
}

fn engine() -> SyncLoop<RecordingSink> {
    SyncLoop::new(RecordingSink::default(), SyncSettings::default())
}

#[tokio::test(start_paused = true)]
async fn test_polls_on_activation_then_every_interval() {
    let source = SlowSource::new(roster(vec![okay("1"), hospital("2", 1_100)]), Duration::ZERO);
    let clock = TokioClock::starting_at(at(1_000));
    let (tx, rx) = mpsc::channel(8);
    let mut engine = engine();

    let driver = run_sync_loop(&mut engine, Arc::clone(&source), rx, &clock, |_| {});
    let controller = async {
        tx.send(ViewSignal::Activated {
            faction_id: Some(faction()),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(12_500)).await;
        tx.send(ViewSignal::Shutdown).await.unwrap();
    };
    tokio::join!(driver, controller);

    // t=0, t=5, t=10
    assert_eq!(source.calls(), 3);
    // the countdown kept ticking between polls
    let countdown_renders = engine
        .sink()
        .cells
        .iter()
        .filter(|(id, ..)| id.as_str() == "2")
        .count();
    assert!(countdown_renders >= 10);
    // shutdown tears the view down
    assert!(!engine.is_active());
    assert!(engine.scheduler().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_missing_faction_never_polls() {
    let source = SlowSource::new(roster(vec![okay("1")]), Duration::ZERO);
    let clock = TokioClock::starting_at(at(1_000));
    let (tx, rx) = mpsc::channel(8);
    let mut engine = engine();

    let driver = run_sync_loop(&mut engine, Arc::clone(&source), rx, &clock, |_| {});
    let controller = async {
        tx.send(ViewSignal::Activated { faction_id: None }).await.unwrap();
        tokio::time::sleep(Duration::from_secs(20)).await;
        tx.send(ViewSignal::Shutdown).await.unwrap();
    };
    tokio::join!(driver, controller);

    assert_eq!(source.calls(), 0);
    assert!(engine.sink().cells.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_result_from_before_roster_replacement_is_discarded() {
    let source = SlowSource::new(roster(vec![okay("1")]), Duration::from_secs(3));
    let clock = TokioClock::starting_at(at(1_000));
    let (tx, rx) = mpsc::channel(8);
    let mut engine = engine();
    let mut seen: Vec<Event> = Vec::new();

    let driver = run_sync_loop(&mut engine, Arc::clone(&source), rx, &clock, |events| {
        seen.extend_from_slice(events)
    });
    let controller = async {
        tx.send(ViewSignal::Activated {
            faction_id: Some(faction()),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        tx.send(ViewSignal::RosterReplaced).await.unwrap();
        tokio::time::sleep(Duration::from_millis(4_000)).await;
        tx.send(ViewSignal::Shutdown).await.unwrap();
    };
    tokio::join!(driver, controller);

    assert_eq!(source.calls(), 2);
    assert!(seen.iter().any(|e| matches!(
        e,
        Event::StaleResultDiscarded {
            result_generation: 1,
            current_generation: 2,
            ..
        }
    )));
    let applied = seen
        .iter()
        .filter(|e| matches!(e, Event::SnapshotApplied { .. }))
        .count();
    assert_eq!(applied, 1);
    assert_eq!(engine.sink().last_text("1"), Some("Okay"));
}

#[tokio::test(start_paused = true)]
async fn test_deactivation_stops_polling() {
    let source = SlowSource::new(roster(vec![okay("1")]), Duration::ZERO);
    let clock = TokioClock::starting_at(at(1_000));
    let (tx, rx) = mpsc::channel(8);
    let mut engine = engine();

    let driver = run_sync_loop(&mut engine, Arc::clone(&source), rx, &clock, |_| {});
    let controller = async {
        tx.send(ViewSignal::Activated {
            faction_id: Some(faction()),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        tx.send(ViewSignal::Deactivated).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(tx);
    };
    tokio::join!(driver, controller);

    assert_eq!(source.calls(), 1);
    assert!(engine.entry(&MemberId::from("1")).is_none());
}
