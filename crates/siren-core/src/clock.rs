//! Time sources for stamping incidents and history entries.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

/// Supplies the current time to the store.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests and replays.
///
/// Returns `start`, then `start + step`, `start + 2 * step`, ... on
/// successive reads. A zero step freezes time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    start: DateTime<Utc>,
    step: Duration,
    reads: Cell<i32>,
}

impl FixedClock {
    #[must_use]
    pub fn frozen(at: DateTime<Utc>) -> Self {
        Self::stepping(at, Duration::zero())
    }

    #[must_use]
    pub const fn stepping(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            start,
            step,
            reads: Cell::new(0),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.reads.get();
        self.reads.set(n.saturating_add(1));
        self.start + self.step * n
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn stepping_clock_advances_per_read() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::stepping(start, Duration::seconds(30));
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::seconds(30));
        assert_eq!(clock.now(), start + Duration::seconds(60));
    }

    #[test]
    fn frozen_clock_never_moves() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::frozen(start);
        assert_eq!(clock.now(), clock.now());
    }
}
