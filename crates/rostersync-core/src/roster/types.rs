//! Roster data model.
//!
//! A [`Snapshot`] is one polled set of member statuses. Deadlines (`until`)
//! are absolute epoch seconds, exactly as the upstream API reports them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque member identifier, unique within one roster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Faction identifier used as the fetch parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(String);

impl FactionId {
    /// Returns `None` for blank input so callers can surface `MissingIdentity`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Member state as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberState {
    Okay,
    Hospital,
    Traveling,
    Abroad,
    /// Any state this engine does not rank (Jail, Federal, Fallen, ...).
    Other(String),
}

impl MemberState {
    pub fn as_str(&self) -> &str {
        match self {
            MemberState::Okay => "Okay",
            MemberState::Hospital => "Hospital",
            MemberState::Traveling => "Traveling",
            MemberState::Abroad => "Abroad",
            MemberState::Other(raw) => raw,
        }
    }

    /// Whether `until` carries meaning for this state.
    pub fn has_deadline(&self) -> bool {
        matches!(
            self,
            MemberState::Hospital | MemberState::Traveling | MemberState::Abroad
        )
    }
}

impl From<&str> for MemberState {
    fn from(raw: &str) -> Self {
        match raw {
            "Okay" => MemberState::Okay,
            "Hospital" => MemberState::Hospital,
            "Traveling" => MemberState::Traveling,
            "Abroad" => MemberState::Abroad,
            other => MemberState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one member at one poll instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStatus {
    pub member_id: MemberId,
    /// Display name, when the source provides one.
    #[serde(default)]
    pub name: Option<String>,
    pub state: MemberState,
    /// Absolute deadline in epoch seconds.
    #[serde(default)]
    pub until: Option<i64>,
    /// Free-text location/detail ("Traveling to Mexico", "In Japan", ...).
    #[serde(default)]
    pub description: String,
}

impl MemberStatus {
    pub fn new(member_id: impl Into<MemberId>, state: MemberState) -> Self {
        Self {
            member_id: member_id.into(),
            name: None,
            state,
            until: None,
            description: String::new(),
        }
    }

    pub fn with_until(mut self, until: i64) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The tuple the differ compares.
    pub fn change_key(&self) -> (&MemberState, Option<i64>) {
        (&self.state, self.until)
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Member statuses keyed by id, as returned by a roster fetch.
pub type Roster = BTreeMap<MemberId, MemberStatus>;

/// One polled roster at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub members: Roster,
}

impl Snapshot {
    pub fn new(taken_at: DateTime<Utc>, members: Roster) -> Self {
        Self { taken_at, members }
    }

    /// Build a snapshot from an iterator of statuses (later duplicates win).
    pub fn from_statuses(
        taken_at: DateTime<Utc>,
        statuses: impl IntoIterator<Item = MemberStatus>,
    ) -> Self {
        let members = statuses
            .into_iter()
            .map(|s| (s.member_id.clone(), s))
            .collect();
        Self { taken_at, members }
    }

    pub fn get(&self, id: &MemberId) -> Option<&MemberStatus> {
        self.members.get(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_state_parses_known_and_unknown() {
        assert_eq!(MemberState::from("Hospital"), MemberState::Hospital);
        assert_eq!(MemberState::from("Abroad"), MemberState::Abroad);
        assert_eq!(
            MemberState::from("Jail"),
            MemberState::Other("Jail".to_string())
        );
        assert_eq!(MemberState::from("Jail").as_str(), "Jail");
    }

    #[test]
    fn faction_id_rejects_blank() {
        assert!(FactionId::parse("   ").is_none());
        assert_eq!(FactionId::parse(" 8151 ").unwrap().as_str(), "8151");
    }

    #[test]
    fn snapshot_from_statuses_keys_by_member() {
        let snap = Snapshot::from_statuses(
            Utc::now(),
            vec![
                MemberStatus::new("1", MemberState::Okay),
                MemberStatus::new("2", MemberState::Hospital).with_until(10),
            ],
        );
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get(&MemberId::new("2")).unwrap().until, Some(10));
    }

    #[test]
    fn deadline_states() {
        assert!(MemberState::Hospital.has_deadline());
        assert!(MemberState::Traveling.has_deadline());
        assert!(!MemberState::Okay.has_deadline());
        assert!(!MemberState::Other("Jail".into()).has_deadline());
    }
}
