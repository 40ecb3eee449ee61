mod clock;
mod driver;
mod sync_loop;

pub use clock::{Clock, SystemClock, TokioClock};
pub use driver::{run_sync_loop, ViewSignal};
pub use sync_loop::{PollTicket, SyncLoop, SyncSettings};
