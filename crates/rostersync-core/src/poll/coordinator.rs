//! Poll coordination: cadence gate and failure cooldown.
//!
//! The upstream API is rate limited. Every failure, a rate-limit answer or
//! anything else, puts polling into a fixed cooldown window measured from
//! the failure's timestamp. There is no exponential backoff and no retry
//! within a cycle; a second failure simply restarts the window.
//!
//! The cooldown is the only state that survives view re-initialization.
//! Access is single-threaded; a multi-worker host must serialize it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::integrations::RosterSource;
use crate::roster::{FactionId, Roster, Snapshot};
use crate::sync::SyncSettings;

/// Process-wide cooldown deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownState {
    cooldown_until: Option<DateTime<Utc>>,
}

impl CooldownState {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    pub fn until(&self) -> Option<DateTime<Utc>> {
        self.cooldown_until
    }

    /// Start (or restart) the window at `now`. Never stacks.
    fn enter(&mut self, now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
        let until = now + window;
        self.cooldown_until = Some(until);
        until
    }
}

/// Why a poll attempt did not reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollSkip {
    /// Less than one poll interval since the previous attempt.
    NotDue,
    /// Inside the failure cooldown window.
    Cooldown,
    /// A fetch for this view is still outstanding.
    InFlight,
}

/// Result of one completed fetch, after cooldown bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub enum PollResult {
    Fresh(Snapshot),
    Failed {
        error: FetchError,
        cooldown_until: DateTime<Utc>,
    },
}

impl PollResult {
    pub fn into_snapshot(self) -> Option<Snapshot> {
        match self {
            PollResult::Fresh(snapshot) => Some(snapshot),
            PollResult::Failed { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct PollCoordinator {
    cooldown: CooldownState,
    cooldown_window: Duration,
    interval: Duration,
    last_attempt: Option<DateTime<Utc>>,
}

impl PollCoordinator {
    pub fn new(interval: std::time::Duration, cooldown: std::time::Duration) -> Self {
        Self {
            cooldown: CooldownState::default(),
            cooldown_window: Duration::from_std(cooldown).unwrap_or_else(|_| Duration::minutes(5)),
            interval: Duration::from_std(interval).unwrap_or_else(|_| Duration::seconds(5)),
            last_attempt: None,
        }
    }

    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self::new(settings.poll_interval, settings.cooldown)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn cooldown(&self) -> &CooldownState {
        &self.cooldown
    }

    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        self.cooldown.is_active(now)
    }

    /// Whether a poll interval has elapsed since the last attempt.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => now - last >= self.interval,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Forget the cadence so the next attempt is due immediately.
    /// The cooldown is kept.
    pub fn reset_cadence(&mut self) {
        self.last_attempt = None;
    }

    /// Cadence and cooldown gate used by the sync loop.
    ///
    /// A due attempt consumes the interval even when the cooldown then
    /// suppresses it.
    pub fn try_begin(&mut self, now: DateTime<Utc>) -> Result<(), PollSkip> {
        if !self.is_due(now) {
            return Err(PollSkip::NotDue);
        }
        self.last_attempt = Some(now);
        if self.in_cooldown(now) {
            tracing::debug!(until = ?self.cooldown.until(), "in cooldown, skipping fetch");
            return Err(PollSkip::Cooldown);
        }
        Ok(())
    }

    /// Book a completed fetch. Failures start the cooldown at `attempted_at`,
    /// the moment the fetch was dispatched; snapshots are stamped `now`.
    pub fn record(
        &mut self,
        faction_id: &FactionId,
        result: Result<Roster, FetchError>,
        attempted_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> PollResult {
        match result {
            Ok(members) => {
                tracing::debug!(faction = %faction_id, members = members.len(), "roster fetched");
                PollResult::Fresh(Snapshot::new(now, members))
            }
            Err(error) => {
                let cooldown_until = self.cooldown.enter(attempted_at, self.cooldown_window);
                if error.is_rate_limited() {
                    tracing::warn!(faction = %faction_id, %cooldown_until, "rate limited, cooling down");
                } else {
                    tracing::warn!(faction = %faction_id, %error, %cooldown_until, "fetch failed, cooling down");
                }
                PollResult::Failed {
                    error,
                    cooldown_until,
                }
            }
        }
    }

    /// Fetch the roster unless in cooldown. `None` means "no data".
    pub async fn poll<S: RosterSource + ?Sized>(
        &mut self,
        source: &S,
        faction_id: &FactionId,
        now: DateTime<Utc>,
    ) -> Option<Snapshot> {
        if self.in_cooldown(now) {
            tracing::debug!(until = ?self.cooldown.until(), "in cooldown, skipping fetch");
            return None;
        }
        let result = source.fetch_roster(faction_id).await;
        self.record(faction_id, result, now, now).into_snapshot()
    }
}

impl Default for PollCoordinator {
    fn default() -> Self {
        Self::from_settings(&SyncSettings::default())
    }
}
