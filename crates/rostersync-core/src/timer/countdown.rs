//! Per-member countdown scheduler.
//!
//! Like the rest of the engine this is wall-clock driven and owns no
//! threads: the caller invokes [`CountdownScheduler::tick`] periodically and
//! gets back what to re-render. Every live countdown is re-evaluated on
//! every `tick`, and a re-render is reported only when the whole-second
//! remaining value moved, so calling `tick` often is harmless and late
//! wake-ups never skip a second.
//!
//! ## Lifecycle per member
//!
//! ```text
//! start -> Remaining* -> Expired      (terminal, entry removed)
//!   \-------> cancel                  (idempotent)
//! ```
//!
//! The scheduler is the only owner of timer handles. At most one countdown
//! exists per member: `start` replaces any previous one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::roster::MemberId;

/// Identifies one registration. A restart for the same member gets a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// What a countdown produced on start or tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownTick {
    /// Still running; re-render `text` and use `remaining_secs` as sort weight.
    Remaining {
        member_id: MemberId,
        remaining_secs: i64,
        text: String,
    },
    /// Deadline reached; the countdown has already been released.
    Expired { member_id: MemberId, handle: TimerHandle },
}

impl CountdownTick {
    pub fn member_id(&self) -> &MemberId {
        match self {
            CountdownTick::Remaining { member_id, .. } => member_id,
            CountdownTick::Expired { member_id, .. } => member_id,
        }
    }
}

#[derive(Debug, Clone)]
struct Countdown {
    handle: TimerHandle,
    until: i64,
    /// Remaining seconds last reported to the caller.
    shown: i64,
}

/// Arena of live countdowns keyed by member.
#[derive(Debug)]
pub struct CountdownScheduler {
    timers: BTreeMap<MemberId, Countdown>,
    next_handle: u64,
}

impl CountdownScheduler {
    pub fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
            next_handle: 1,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_active(&self, member_id: &MemberId) -> bool {
        self.timers.contains_key(member_id)
    }

    pub fn handle(&self, member_id: &MemberId) -> Option<TimerHandle> {
        self.timers.get(member_id).map(|c| c.handle)
    }

    /// Deadline the active countdown is tracking, if any.
    pub fn deadline(&self, member_id: &MemberId) -> Option<i64> {
        self.timers.get(member_id).map(|c| c.until)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Register a countdown for `member_id` towards `until` (epoch seconds).
    ///
    /// Any previous countdown for the member is cancelled first. The first
    /// tick is evaluated immediately; if the deadline has already passed the
    /// countdown expires on the spot and nothing stays registered.
    pub fn start(
        &mut self,
        member_id: MemberId,
        until: i64,
        now: DateTime<Utc>,
    ) -> (TimerHandle, CountdownTick) {
        self.cancel(&member_id);

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;

        let remaining = until - now.timestamp();
        if remaining <= 0 {
            tracing::debug!(member = %member_id, "countdown started past its deadline");
            return (handle, CountdownTick::Expired { member_id, handle });
        }

        self.timers.insert(
            member_id.clone(),
            Countdown {
                handle,
                until,
                shown: remaining,
            },
        );
        tracing::debug!(member = %member_id, handle = handle.value(), remaining, "countdown started");
        (
            handle,
            CountdownTick::Remaining {
                member_id,
                remaining_secs: remaining,
                text: format_hms(remaining),
            },
        )
    }

    /// Cancel the countdown for `member_id`. Returns whether one was live.
    pub fn cancel(&mut self, member_id: &MemberId) -> bool {
        let removed = self.timers.remove(member_id).is_some();
        if removed {
            tracing::debug!(member = %member_id, "countdown cancelled");
        }
        removed
    }

    /// Cancel every countdown (view re-initialization).
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    /// Re-evaluate every live countdown at `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<CountdownTick> {
        let now_secs = now.timestamp();
        let mut out = Vec::new();
        let mut expired = Vec::new();

        for (member_id, countdown) in self.timers.iter_mut() {
            let remaining = countdown.until - now_secs;
            if remaining <= 0 {
                expired.push((member_id.clone(), countdown.handle));
                continue;
            }
            if remaining == countdown.shown {
                continue;
            }
            countdown.shown = remaining;
            out.push(CountdownTick::Remaining {
                member_id: member_id.clone(),
                remaining_secs: remaining,
                text: format_hms(remaining),
            });
        }

        for (member_id, handle) in expired {
            self.timers.remove(&member_id);
            tracing::debug!(member = %member_id, handle = handle.value(), "countdown expired");
            out.push(CountdownTick::Expired { member_id, handle });
        }
        out
    }
}

impl Default for CountdownScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-padded `HH:MM:SS`. Hours are not capped at 99.
pub fn format_hms(secs: i64) -> String {
    let secs = secs.max(0);
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}
