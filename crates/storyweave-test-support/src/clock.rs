//! Test clock — a `Clock` that always returns a fixed instant.

use chrono::{DateTime, Utc};
use storyweave_core::clock::Clock;

/// A clock frozen at the wrapped instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
