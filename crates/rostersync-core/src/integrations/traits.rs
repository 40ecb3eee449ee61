use async_trait::async_trait;

use crate::error::FetchError;
use crate::roster::{ColorHint, FactionId, MemberId, Roster};

/// Inbound capability: fetch the current roster of a faction.
///
/// The only suspension point of the engine. Implementations must tell a
/// rate-limit answer apart from other failures (`FetchError::RateLimited`).
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch_roster(&self, faction_id: &FactionId) -> Result<Roster, FetchError>;
}

/// Outbound capability: the host that displays the roster.
///
/// The engine never reads anything back from the sink; rendered text is
/// output only.
pub trait StatusSink {
    /// Render one member's status cell.
    fn set_status_cell(
        &mut self,
        member_id: &MemberId,
        text: &str,
        color: ColorHint,
        sort_weight: i64,
    );

    /// Re-attach the visible rows in this order.
    fn apply_order(&mut self, ordered: &[MemberId]);

    /// Called once at the end of every cycle or tick that touched the sink.
    fn flush(&mut self) {
        // default no-op
    }

    /// Called when the view is torn down; the host should drop what it shows.
    fn clear(&mut self) {
        // default no-op
    }
}
