//! Time source — owns "now" and the calendar-day rule.
//!
//! All day arithmetic happens in UTC. Streaks and daily caps key on the UTC
//! calendar date of `occurred_at`, never on a client-local date.

use chrono::{DateTime, NaiveDate, Utc};

pub trait GameClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl GameClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Pinned clock for tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl GameClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The UTC calendar day of a timestamp.
pub fn utc_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}
