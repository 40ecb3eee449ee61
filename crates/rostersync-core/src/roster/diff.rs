//! Snapshot diffing.

use super::types::{MemberStatus, Snapshot};

/// Members of `current` whose `(state, until)` differ from `previous`.
///
/// With no previous snapshot every member counts as changed. Members missing
/// from `previous` are always included; members missing from `current` are
/// not reported. Output follows the snapshot's member-id order.
pub fn changed_members<'a>(
    previous: Option<&Snapshot>,
    current: &'a Snapshot,
) -> Vec<&'a MemberStatus> {
    let Some(previous) = previous else {
        return current.members.values().collect();
    };

    current
        .members
        .values()
        .filter(|status| match previous.get(&status.member_id) {
            Some(prev) => prev.change_key() != status.change_key(),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::types::{MemberId, MemberState};
    use chrono::Utc;

    fn snap(statuses: Vec<MemberStatus>) -> Snapshot {
        Snapshot::from_statuses(Utc::now(), statuses)
    }

    fn ids(changed: &[&MemberStatus]) -> Vec<String> {
        changed.iter().map(|s| s.member_id.to_string()).collect()
    }

    #[test]
    fn first_cycle_reports_everything() {
        let current = snap(vec![
            MemberStatus::new("1", MemberState::Okay),
            MemberStatus::new("2", MemberState::Hospital).with_until(99),
        ]);
        assert_eq!(ids(&changed_members(None, &current)), vec!["1", "2"]);
    }

    #[test]
    fn identical_snapshots_report_nothing() {
        let prev = snap(vec![
            MemberStatus::new("1", MemberState::Okay),
            MemberStatus::new("2", MemberState::Hospital).with_until(99),
        ]);
        assert!(changed_members(Some(&prev), &prev).is_empty());
    }

    #[test]
    fn until_or_state_change_is_reported() {
        let prev = snap(vec![
            MemberStatus::new("1", MemberState::Okay),
            MemberStatus::new("2", MemberState::Hospital).with_until(99),
            MemberStatus::new("3", MemberState::Traveling).with_until(50),
        ]);
        let current = snap(vec![
            MemberStatus::new("1", MemberState::Hospital).with_until(120),
            MemberStatus::new("2", MemberState::Hospital).with_until(150),
            MemberStatus::new("3", MemberState::Traveling).with_until(50),
        ]);
        assert_eq!(ids(&changed_members(Some(&prev), &current)), vec!["1", "2"]);
    }

    #[test]
    fn description_only_change_is_not_reported() {
        let prev = snap(vec![MemberStatus::new("1", MemberState::Abroad)
            .with_until(10)
            .with_description("In Mexico")]);
        let current = snap(vec![MemberStatus::new("1", MemberState::Abroad)
            .with_until(10)
            .with_description("In Japan")]);
        assert!(changed_members(Some(&prev), &current).is_empty());
    }

    #[test]
    fn new_members_included_removed_members_ignored() {
        let prev = snap(vec![
            MemberStatus::new("1", MemberState::Okay),
            MemberStatus::new("2", MemberState::Okay),
        ]);
        let current = snap(vec![
            MemberStatus::new("1", MemberState::Okay),
            MemberStatus::new("3", MemberState::Okay),
        ]);
        let changed = changed_members(Some(&prev), &current);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].member_id, MemberId::new("3"));
    }
}
