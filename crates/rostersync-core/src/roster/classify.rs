//! Status classification.
//!
//! Maps a raw [`MemberStatus`] plus the current wall-clock time to a
//! [`DisplayEntry`]: an urgency category, a sort weight and the text to
//! render. Pure: no timers, no side effects. Countdown re-evaluation while a
//! member is in hospital is the job of [`crate::timer::CountdownScheduler`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{MemberId, MemberState, MemberStatus};
use crate::timer::format_hms;

/// Sort weight for entries that carry no remaining time.
pub const NO_WEIGHT: i64 = -1;

/// Urgency rank, used as the primary sort key (lower is more urgent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Okay, or out of hospital ("Ready").
    Ready = 0,
    /// Hospital countdown running.
    Hospital = 1,
    /// Traveling, en route.
    EnRoute = 2,
    /// Present abroad.
    Abroad = 3,
    /// Any state this engine does not rank.
    Unknown = 4,
}

impl Category {
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Categories whose members are secondarily ordered by sort weight.
    pub fn orders_by_weight(self) -> bool {
        matches!(self, Category::Hospital | Category::EnRoute)
    }
}

/// Color hint passed to the render sink. The host maps it to a real color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorHint {
    Ready,
    Countdown,
    Travel,
    Other,
}

impl ColorHint {
    pub fn default_hex(self) -> &'static str {
        match self {
            ColorHint::Ready => "#66FF66",
            ColorHint::Countdown => "#FF6666",
            ColorHint::Travel => "#5AC8FA",
            ColorHint::Other => "#AAAAAA",
        }
    }
}

/// Derived, renderable state for one member.
///
/// Category and weight are the engine's own model; `rendered_text` is
/// output only and never parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub member_id: MemberId,
    pub category: Category,
    /// Remaining seconds, or [`NO_WEIGHT`].
    pub sort_weight: i64,
    pub rendered_text: String,
    pub color: ColorHint,
}

impl DisplayEntry {
    /// The terminal state of an expired hospital countdown.
    pub fn ready(member_id: MemberId) -> Self {
        Self {
            member_id,
            category: Category::Ready,
            sort_weight: NO_WEIGHT,
            rendered_text: "Ready".to_string(),
            color: ColorHint::Ready,
        }
    }
}

/// Classify one member status at `now`.
pub fn classify(status: &MemberStatus, now: DateTime<Utc>) -> DisplayEntry {
    let now_secs = now.timestamp();
    let member_id = status.member_id.clone();
    let remaining = status.until.map(|until| until - now_secs);

    match &status.state {
        MemberState::Hospital => match remaining {
            Some(rem) if rem > 0 => DisplayEntry {
                member_id,
                category: Category::Hospital,
                sort_weight: rem,
                rendered_text: format_hms(rem),
                color: ColorHint::Countdown,
            },
            _ => DisplayEntry::ready(member_id),
        },
        MemberState::Traveling => DisplayEntry {
            member_id,
            category: Category::EnRoute,
            sort_weight: remaining.unwrap_or(NO_WEIGHT),
            rendered_text: fallback_text(format_travel(&status.description), &status.state),
            color: ColorHint::Travel,
        },
        MemberState::Abroad => DisplayEntry {
            member_id,
            category: Category::Abroad,
            sort_weight: remaining.unwrap_or(NO_WEIGHT),
            rendered_text: fallback_text(format_abroad(&status.description), &status.state),
            color: ColorHint::Travel,
        },
        MemberState::Okay => DisplayEntry {
            member_id,
            category: Category::Ready,
            sort_weight: NO_WEIGHT,
            rendered_text: "Okay".to_string(),
            color: ColorHint::Ready,
        },
        MemberState::Other(raw) => DisplayEntry {
            member_id,
            category: Category::Unknown,
            sort_weight: NO_WEIGHT,
            rendered_text: raw.clone(),
            color: ColorHint::Other,
        },
    }
}

const TRAVEL_DESTINATIONS: &[(&str, &str)] = &[
    ("to Cayman Islands", "to Caymans"),
    ("to United Kingdom", "to UK"),
    ("to United Arab Emirates", "to UAE"),
    ("to South Africa", "to SA"),
    ("to Switzerland", "to Swiss"),
];

const ABROAD_LOCATIONS: &[(&str, &str)] = &[
    ("in Cayman Islands", "in Caymans"),
    ("in United Kingdom", "in UK"),
    ("in United Arab Emirates", "in UAE"),
    ("in South Africa", "in SA"),
    ("in Switzerland", "in Swiss"),
];

/// Short text for a traveling member ("Traveling to United Kingdom" -> "to UK").
///
/// Unmapped destinations keep their name with the leading marker lowercased.
pub fn format_travel(description: &str) -> String {
    let trimmed = description.trim();
    if trimmed.starts_with("Returning") {
        return "to Torn".to_string();
    }
    let dest = trimmed.strip_prefix("Traveling ").unwrap_or(trimmed);
    let dest = lowercase_marker(dest, "to");
    lookup(TRAVEL_DESTINATIONS, &dest).unwrap_or(dest)
}

/// Short text for a member abroad ("In South Africa" -> "in SA").
pub fn format_abroad(description: &str) -> String {
    let loc = lowercase_marker(description.trim(), "in");
    lookup(ABROAD_LOCATIONS, &loc).unwrap_or(loc)
}

fn lookup(table: &[(&str, &str)], key: &str) -> Option<String> {
    table
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| to.to_string())
}

/// Replace a leading `marker ` word (any casing) with its lowercase form.
fn lowercase_marker(text: &str, marker: &str) -> String {
    let len = marker.len();
    let has_marker = text.len() > len
        && text.is_char_boundary(len)
        && text[..len].eq_ignore_ascii_case(marker)
        && text[len..].starts_with(' ');
    if has_marker {
        format!("{marker}{}", &text[len..])
    } else {
        text.to_string()
    }
}

fn fallback_text(text: String, state: &MemberState) -> String {
    if text.is_empty() {
        state.as_str().to_string()
    } else {
        text
    }
}
