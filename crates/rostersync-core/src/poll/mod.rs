mod coordinator;

pub use coordinator::{CooldownState, PollCoordinator, PollResult, PollSkip};
