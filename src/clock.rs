//! Wall-clock abstraction so window math can be tested.

use chrono::Utc;

/// Source of "now" in Unix epoch seconds.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Real UTC wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        Utc::now().timestamp()
    }
}
