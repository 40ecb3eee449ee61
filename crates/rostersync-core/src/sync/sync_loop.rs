//! The sync loop: poll, diff, classify, render, order.
//!
//! `SyncLoop` owns every piece of per-view state (previous snapshot, row
//! set, countdowns) and drives the pure components in a fixed order per
//! cycle:
//!
//! ```text
//! begin_poll -> fetch (host) -> complete_poll
//!                                 |- diff against previous snapshot
//!                                 |- classify every member, render changed ones
//!                                 |- start / cancel hospital countdowns
//!                                 `- sort rows, apply order if it moved
//! tick -> countdown re-render / expiry -> sort rows
//! ```
//!
//! Like the timer engine it is caller-driven: no threads, every operation
//! takes the wall-clock `now`. The split between `begin_poll` and
//! `complete_poll` lets a host run the fetch elsewhere while ticks keep
//! being served. Results carry the generation they were started under; a
//! re-initialization bumps the generation and stale results are dropped.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::time::Duration;

use crate::error::{FetchError, SyncError};
use crate::events::Event;
use crate::integrations::{RosterSource, StatusSink};
use crate::poll::{PollCoordinator, PollResult, PollSkip};
use crate::roster::{
    changed_members, classify, ordering, Category, DisplayEntry, FactionId, MemberId, Roster,
    Snapshot,
};
use crate::timer::{CountdownScheduler, CountdownTick};

/// Cadences of one sync loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Minimum spacing between fetch attempts.
    pub poll_interval: Duration,
    /// How often the host should call [`SyncLoop::tick`].
    pub tick_interval: Duration,
    /// Fetching is suppressed this long after any failure.
    pub cooldown: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            tick_interval: Duration::from_secs(1),
            cooldown: Duration::from_secs(300),
        }
    }
}

/// Permission to run one fetch, tagged with the view generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTicket {
    pub generation: u64,
    pub faction_id: FactionId,
    /// When the fetch was dispatched. A failure cools down from here.
    pub started_at: DateTime<Utc>,
}

pub struct SyncLoop<K: StatusSink> {
    sink: K,
    settings: SyncSettings,
    coordinator: PollCoordinator,
    scheduler: CountdownScheduler,
    faction_id: Option<FactionId>,
    generation: u64,
    in_flight: Option<u64>,
    previous: Option<Snapshot>,
    rows: IndexMap<MemberId, DisplayEntry>,
    /// Row membership changed since the host last got an order.
    order_dirty: bool,
    events: Vec<Event>,
}

impl<K: StatusSink> SyncLoop<K> {
    pub fn new(sink: K, settings: SyncSettings) -> Self {
        Self {
            sink,
            settings,
            coordinator: PollCoordinator::from_settings(&settings),
            scheduler: CountdownScheduler::new(),
            faction_id: None,
            generation: 0,
            in_flight: None,
            previous: None,
            rows: IndexMap::new(),
            order_dirty: false,
            events: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.faction_id.is_some()
    }

    pub fn faction_id(&self) -> Option<&FactionId> {
        self.faction_id.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Visible rows in their current order.
    pub fn entries(&self) -> impl Iterator<Item = &DisplayEntry> {
        self.rows.values()
    }

    pub fn entry(&self, member_id: &MemberId) -> Option<&DisplayEntry> {
        self.rows.get(member_id)
    }

    pub fn order(&self) -> Vec<MemberId> {
        ordering::order_of(&self.rows)
    }

    pub fn previous_snapshot(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn scheduler(&self) -> &CountdownScheduler {
        &self.scheduler
    }

    pub fn coordinator(&self) -> &PollCoordinator {
        &self.coordinator
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Take the events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── View lifecycle ───────────────────────────────────────────────

    /// Initialize the view for `faction_id`.
    ///
    /// Without an identity the view stays inactive and no poll is started.
    pub fn activate(
        &mut self,
        faction_id: Option<FactionId>,
        now: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        self.reset_view();
        let Some(faction_id) = faction_id else {
            self.faction_id = None;
            tracing::warn!("no faction id, sync loop not started");
            return Err(SyncError::MissingIdentity);
        };

        tracing::info!(faction = %faction_id, generation = self.generation, "view activated");
        self.events.push(Event::Activated {
            faction_id: faction_id.clone(),
            generation: self.generation,
            at: now,
        });
        self.faction_id = Some(faction_id);
        Ok(())
    }

    /// Rebuild all view state after the host replaced the roster container.
    ///
    /// Timers are cancelled, rows and the previous snapshot dropped. The
    /// cooldown survives; the next poll is due immediately.
    pub fn reinitialize(&mut self, now: DateTime<Utc>) -> Result<(), SyncError> {
        if self.faction_id.is_none() {
            return Err(SyncError::Inactive);
        }
        let cancelled_timers = self.reset_view();
        tracing::info!(generation = self.generation, cancelled_timers, "view re-initialized");
        self.events.push(Event::Reinitialized {
            generation: self.generation,
            cancelled_timers,
            at: now,
        });
        Ok(())
    }

    /// Leave the view. Outstanding results will be discarded.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        if self.faction_id.is_none() {
            return;
        }
        self.reset_view();
        self.faction_id = None;
        tracing::info!(generation = self.generation, "view deactivated");
        self.events.push(Event::Deactivated {
            generation: self.generation,
            at: now,
        });
    }

    fn reset_view(&mut self) -> usize {
        self.generation += 1;
        let cancelled = self.scheduler.cancel_all();
        self.rows.clear();
        self.previous = None;
        self.in_flight = None;
        self.order_dirty = false;
        self.coordinator.reset_cadence();
        self.sink.clear();
        cancelled
    }

    // ── Poll cycle ───────────────────────────────────────────────────

    /// Ask for permission to fetch. `None` when inactive, not due, in
    /// cooldown or while a fetch is still outstanding.
    pub fn begin_poll(&mut self, now: DateTime<Utc>) -> Option<PollTicket> {
        let faction_id = self.faction_id.clone()?;
        if self.in_flight.is_some() {
            if self.coordinator.is_due(now) {
                tracing::debug!("previous fetch outstanding, skipping poll");
                self.events.push(Event::PollSkipped {
                    reason: PollSkip::InFlight,
                    at: now,
                });
            }
            return None;
        }

        match self.coordinator.try_begin(now) {
            Ok(()) => {
                self.in_flight = Some(self.generation);
                Some(PollTicket {
                    generation: self.generation,
                    faction_id,
                    started_at: now,
                })
            }
            Err(PollSkip::NotDue) => None,
            Err(reason) => {
                self.events.push(Event::PollSkipped { reason, at: now });
                None
            }
        }
    }

    /// Feed back the outcome of the fetch started with `ticket`.
    ///
    /// Returns `true` when a fresh snapshot was applied.
    ///
    /// A failure starts the process-wide cooldown even when the ticket is
    /// stale; only stale data is dropped. The cooldown runs from
    /// `ticket.started_at`.
    pub fn complete_poll(
        &mut self,
        ticket: PollTicket,
        result: Result<Roster, FetchError>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }

        let stale = ticket.generation != self.generation
            || self.faction_id.as_ref() != Some(&ticket.faction_id);

        match self.coordinator.record(&ticket.faction_id, result, ticket.started_at, now) {
            PollResult::Failed {
                error,
                cooldown_until,
            } => {
                self.events.push(Event::CooldownEntered {
                    until: cooldown_until,
                    rate_limited: error.is_rate_limited(),
                    reason: error.to_string(),
                    at: now,
                });
                false
            }
            PollResult::Fresh(_) if stale => {
                tracing::debug!(
                    result_generation = ticket.generation,
                    current_generation = self.generation,
                    "discarding stale roster"
                );
                self.events.push(Event::StaleResultDiscarded {
                    result_generation: ticket.generation,
                    current_generation: self.generation,
                    at: now,
                });
                false
            }
            PollResult::Fresh(snapshot) => {
                self.apply_snapshot(snapshot, now);
                true
            }
        }
    }

    /// One sequential cycle: gate, fetch, apply.
    pub async fn poll_once<S: RosterSource + ?Sized>(
        &mut self,
        source: &S,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(ticket) = self.begin_poll(now) else {
            return false;
        };
        let result = source.fetch_roster(&ticket.faction_id).await;
        self.complete_poll(ticket, result, now)
    }

    /// Diff, classify and render a fresh snapshot.
    ///
    /// Every member is re-classified so sort keys stay current; the sink is
    /// only called for members whose state or deadline changed, or whose
    /// category moved since the last render.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot, now: DateTime<Utc>) {
        if self.faction_id.is_none() {
            return;
        }

        let changed: HashSet<MemberId> = changed_members(self.previous.as_ref(), &snapshot)
            .into_iter()
            .map(|status| status.member_id.clone())
            .collect();

        let departed: Vec<MemberId> = self
            .rows
            .keys()
            .filter(|id| !snapshot.members.contains_key(*id))
            .cloned()
            .collect();
        for id in &departed {
            self.scheduler.cancel(id);
            self.rows.shift_remove(id);
        }
        if !departed.is_empty() {
            self.order_dirty = true;
        }

        let mut rendered = 0;
        for status in snapshot.members.values() {
            let id = &status.member_id;
            let mut entry = classify(status, now);
            let was_changed = changed.contains(id);

            match (entry.category, status.until) {
                (Category::Hospital, Some(until)) => {
                    if was_changed || self.scheduler.deadline(id) != Some(until) {
                        let (handle, tick) = self.scheduler.start(id.clone(), until, now);
                        match tick {
                            CountdownTick::Remaining {
                                remaining_secs,
                                text,
                                ..
                            } => {
                                entry.sort_weight = remaining_secs;
                                entry.rendered_text = text;
                                self.events.push(Event::CountdownStarted {
                                    member_id: id.clone(),
                                    handle: handle.value(),
                                    remaining_secs,
                                    at: now,
                                });
                            }
                            CountdownTick::Expired { .. } => {
                                entry = DisplayEntry::ready(id.clone());
                            }
                        }
                    }
                }
                _ => {
                    self.scheduler.cancel(id);
                }
            }

            let render = match self.rows.get(id) {
                None => true,
                Some(prev) => was_changed || prev.category != entry.category,
            };
            if render {
                self.sink.set_status_cell(
                    &entry.member_id,
                    &entry.rendered_text,
                    entry.color,
                    entry.sort_weight,
                );
                rendered += 1;
            }

            if self.rows.insert(id.clone(), entry).is_none() {
                self.order_dirty = true;
            }
        }

        tracing::debug!(
            members = snapshot.len(),
            changed = changed.len(),
            rendered,
            "snapshot applied"
        );
        self.events.push(Event::SnapshotApplied {
            members: snapshot.len(),
            changed: changed.len(),
            at: now,
        });
        self.previous = Some(snapshot);

        self.reorder(now);
        self.sink.flush();
    }

    // ── Countdown tick ───────────────────────────────────────────────

    /// Advance hospital countdowns and re-sort. Cheap when nothing is due.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.faction_id.is_none() {
            return;
        }
        let ticks = self.scheduler.tick(now);
        if ticks.is_empty() {
            return;
        }

        for tick in ticks {
            let Some(entry) = self.rows.get_mut(tick.member_id()) else {
                continue;
            };
            match tick {
                CountdownTick::Remaining {
                    remaining_secs,
                    text,
                    ..
                } => {
                    entry.sort_weight = remaining_secs;
                    entry.rendered_text = text;
                }
                CountdownTick::Expired { member_id, .. } => {
                    *entry = DisplayEntry::ready(member_id.clone());
                    self.events.push(Event::CountdownExpired { member_id, at: now });
                }
            }
            self.sink.set_status_cell(
                &entry.member_id,
                &entry.rendered_text,
                entry.color,
                entry.sort_weight,
            );
        }

        self.reorder(now);
        self.sink.flush();
    }

    fn reorder(&mut self, now: DateTime<Utc>) {
        let moved = ordering::sort_rows(&mut self.rows);
        if !moved && !self.order_dirty {
            return;
        }
        self.order_dirty = false;
        let order = ordering::order_of(&self.rows);
        self.sink.apply_order(&order);
        self.events.push(Event::OrderApplied {
            members: order.len(),
            at: now,
        });
    }
}
