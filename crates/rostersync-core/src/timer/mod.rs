mod countdown;

pub use countdown::{format_hms, CountdownScheduler, CountdownTick, TimerHandle};
