use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::poll::PollSkip;
use crate::roster::{FactionId, MemberId};

/// Every state change of a sync loop produces an Event.
/// Hosts may log them, print them, or ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// View became active for a faction.
    Activated {
        faction_id: FactionId,
        generation: u64,
        at: DateTime<Utc>,
    },
    /// Roster container replaced by the host; state rebuilt.
    Reinitialized {
        generation: u64,
        cancelled_timers: usize,
        at: DateTime<Utc>,
    },
    /// View left; timers cancelled, rows dropped.
    Deactivated {
        generation: u64,
        at: DateTime<Utc>,
    },
    /// A poll attempt did not reach the network.
    PollSkipped {
        reason: PollSkip,
        at: DateTime<Utc>,
    },
    /// A fetch failed; polling suppressed until `until`.
    CooldownEntered {
        until: DateTime<Utc>,
        rate_limited: bool,
        reason: String,
        at: DateTime<Utc>,
    },
    /// A fresh snapshot was classified and rendered.
    SnapshotApplied {
        members: usize,
        changed: usize,
        at: DateTime<Utc>,
    },
    /// A fetch result arrived for a generation that is no longer current.
    StaleResultDiscarded {
        result_generation: u64,
        current_generation: u64,
        at: DateTime<Utc>,
    },
    CountdownStarted {
        member_id: MemberId,
        /// Scheduler handle; a restart for a new deadline gets a new one.
        handle: u64,
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    /// Hospital countdown reached zero; member is Ready.
    CountdownExpired {
        member_id: MemberId,
        at: DateTime<Utc>,
    },
    /// Rows re-attached in a new order.
    OrderApplied {
        members: usize,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::PollSkipped {
            reason: PollSkip::Cooldown,
            at: Utc.timestamp_opt(0, 0).unwrap(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PollSkipped");
        assert_eq!(json["reason"], "cooldown");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
