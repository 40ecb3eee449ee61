mod types;
pub mod classify;
pub mod diff;
pub mod ordering;

pub use classify::{classify, format_abroad, format_travel, Category, ColorHint, DisplayEntry, NO_WEIGHT};
pub use diff::changed_members;
pub use types::{FactionId, MemberId, MemberState, MemberStatus, Roster, Snapshot};
