//! Urgency ordering of the visible roster.
//!
//! Primary key is the category rank. Hospital and en-route members are then
//! ordered soonest first; every other category keeps its current relative
//! order, which makes the sort stable and idempotent.

use indexmap::IndexMap;
use std::cmp::Ordering;

use super::classify::DisplayEntry;
use super::types::MemberId;

/// Comparator over display entries.
pub fn compare(a: &DisplayEntry, b: &DisplayEntry) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal if a.category.orders_by_weight() => a.sort_weight.cmp(&b.sort_weight),
        other => other,
    }
}

/// Sort entries in place. Returns `true` when the order changed.
pub fn sort_entries(entries: &mut [DisplayEntry]) -> bool {
    if is_sorted(entries.iter()) {
        return false;
    }
    entries.sort_by(compare);
    true
}

/// Sort the row set in place, keeping it keyed by member.
///
/// Returns `true` when the order changed, so callers only re-attach rows
/// on the host when something actually moved.
pub fn sort_rows(rows: &mut IndexMap<MemberId, DisplayEntry>) -> bool {
    if is_sorted(rows.values()) {
        return false;
    }
    rows.sort_by(|_, a, _, b| compare(a, b));
    true
}

/// Current row order as member ids.
pub fn order_of(rows: &IndexMap<MemberId, DisplayEntry>) -> Vec<MemberId> {
    rows.keys().cloned().collect()
}

fn is_sorted<'a>(mut entries: impl Iterator<Item = &'a DisplayEntry>) -> bool {
    let Some(mut prev) = entries.next() else {
        return true;
    };
    for entry in entries {
        if compare(prev, entry) == Ordering::Greater {
            return false;
        }
        prev = entry;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::classify::{Category, ColorHint, NO_WEIGHT};

    fn entry(id: &str, category: Category, weight: i64) -> DisplayEntry {
        DisplayEntry {
            member_id: MemberId::new(id),
            category,
            sort_weight: weight,
            rendered_text: String::new(),
            color: ColorHint::Other,
        }
    }

    fn ids(entries: &[DisplayEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.member_id.as_str()).collect()
    }

    #[test]
    fn urgency_order_example() {
        let mut entries = vec![
            entry("unknown", Category::Unknown, NO_WEIGHT),
            entry("hosp30", Category::Hospital, 30),
            entry("travel5", Category::EnRoute, 5),
            entry("hosp10", Category::Hospital, 10),
            entry("ready", Category::Ready, NO_WEIGHT),
        ];
        assert!(sort_entries(&mut entries));
        assert_eq!(
            ids(&entries),
            vec!["ready", "hosp10", "hosp30", "travel5", "unknown"]
        );
    }

    #[test]
    fn sorting_sorted_list_changes_nothing() {
        let mut entries = vec![
            entry("a", Category::Ready, NO_WEIGHT),
            entry("b", Category::Hospital, 10),
            entry("c", Category::Abroad, 900),
            entry("d", Category::Abroad, 100),
        ];
        assert!(!sort_entries(&mut entries));
        assert_eq!(ids(&entries), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn abroad_keeps_relative_order() {
        let mut entries = vec![
            entry("x", Category::Unknown, NO_WEIGHT),
            entry("late", Category::Abroad, 900),
            entry("early", Category::Abroad, 100),
        ];
        sort_entries(&mut entries);
        assert_eq!(ids(&entries), vec!["late", "early", "x"]);
    }

    #[test]
    fn overdue_travelers_sort_first_among_travelers() {
        let mut entries = vec![
            entry("soon", Category::EnRoute, 20),
            entry("overdue", Category::EnRoute, -15),
        ];
        sort_entries(&mut entries);
        assert_eq!(ids(&entries), vec!["overdue", "soon"]);
    }

    #[test]
    fn sort_rows_reports_change_once() {
        let mut rows: IndexMap<MemberId, DisplayEntry> = IndexMap::new();
        for e in [
            entry("b", Category::Hospital, 50),
            entry("a", Category::Ready, NO_WEIGHT),
        ] {
            rows.insert(e.member_id.clone(), e);
        }
        assert!(sort_rows(&mut rows));
        assert!(!sort_rows(&mut rows));
        assert_eq!(
            order_of(&rows),
            vec![MemberId::new("a"), MemberId::new("b")]
        );
    }
}
