//! # Rostersync Core Library
//!
//! Keeps a displayed faction roster in sync with the game API: polls member
//! statuses, renders only what changed, runs per-member hospital countdowns
//! and keeps rows ordered by urgency. The CLI binary is a thin host over the
//! same library.
//!
//! ## Architecture
//!
//! - **Roster**: pure classification, diffing and ordering of member statuses
//! - **Timer**: a wall-clock countdown scheduler; the caller invokes `tick()`
//! - **Poll**: cadence gate plus the process-wide failure cooldown
//! - **Sync**: the sync loop state machine and an async tokio driver for it
//! - **Integrations**: the `RosterSource` / `StatusSink` seams, the HTTP
//!   client and keyring access
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SyncLoop`]: per-view state machine
//! - [`CountdownScheduler`]: hospital countdowns
//! - [`PollCoordinator`]: cadence and cooldown
//! - [`TornClient`]: HTTP roster source
//! - [`Config`]: application configuration management

pub mod credentials;
pub mod error;
pub mod events;
pub mod integrations;
pub mod poll;
pub mod roster;
pub mod storage;
pub mod sync;
pub mod timer;

pub use error::{ConfigError, CoreError, CredentialError, FetchError, SyncError};
pub use events::Event;
pub use integrations::{RosterSource, StatusSink, TornClient};
pub use poll::{CooldownState, PollCoordinator, PollResult, PollSkip};
pub use roster::{
    classify, Category, ColorHint, DisplayEntry, FactionId, MemberId, MemberState, MemberStatus,
    Roster, Snapshot,
};
pub use storage::Config;
pub use sync::{
    run_sync_loop, Clock, PollTicket, SyncLoop, SyncSettings, SystemClock, TokioClock, ViewSignal,
};
pub use timer::{format_hms, CountdownScheduler, CountdownTick, TimerHandle};
