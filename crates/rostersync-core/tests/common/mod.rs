//! Shared helpers for rostersync-core integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rostersync_core::{ColorHint, FactionId, MemberId, MemberState, MemberStatus, Roster, StatusSink};

/// Sink that records every call the engine makes.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub cells: Vec<(MemberId, String, ColorHint, i64)>,
    pub orders: Vec<Vec<MemberId>>,
    pub clears: usize,
    pub flushes: usize,
}

impl RecordingSink {
    /// Last text rendered for `member`.
    pub fn last_text(&self, member: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(id, ..)| id.as_str() == member)
            .map(|(_, text, ..)| text.as_str())
    }
}

impl StatusSink for RecordingSink {
    fn set_status_cell(&mut self, member_id: &MemberId, text: &str, color: ColorHint, sort_weight: i64) {
        self.cells
            .push((member_id.clone(), text.to_string(), color, sort_weight));
    }

    fn apply_order(&mut self, ordered: &[MemberId]) {
        self.orders.push(ordered.to_vec());
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn faction() -> FactionId {
    FactionId::parse("8151").unwrap()
}

pub fn roster(statuses: Vec<MemberStatus>) -> Roster {
    statuses
        .into_iter()
        .map(|s| (s.member_id.clone(), s))
        .collect()
}

pub fn hospital(member: &str, until: i64) -> MemberStatus {
    MemberStatus::new(member, MemberState::Hospital).with_until(until)
}

pub fn okay(member: &str) -> MemberStatus {
    MemberStatus::new(member, MemberState::Okay)
}
