//! Incident id generation.
//!
//! The store asks its generator for candidates until one does not collide
//! with an existing incident, so generators only need to be unique "enough"
//! within a session.

use chrono::{DateTime, Utc};

/// Produces candidate ids for newly registered incidents.
pub trait IdGenerator {
    fn next_id(&mut self, now: DateTime<Utc>) -> String;
}

/// Millisecond Unix time, bumped by one when the clock has not advanced.
#[derive(Debug, Clone, Default)]
pub struct ClockIds {
    last: i64,
}

impl IdGenerator for ClockIds {
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();
        self.last = if millis > self.last {
            millis
        } else {
            self.last.saturating_add(1)
        };
        self.last.to_string()
    }
}

/// Zero-padded counter: `001`, `002`, ...
#[derive(Debug, Clone)]
pub struct SequenceIds {
    next: u64,
    width: usize,
}

impl SequenceIds {
    #[must_use]
    pub const fn starting_at(next: u64) -> Self {
        Self { next, width: 3 }
    }

    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

impl Default for SequenceIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequenceIds {
    fn next_id(&mut self, _now: DateTime<Utc>) -> String {
        let id = format!("{:0width$}", self.next, width = self.width);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::{ClockIds, IdGenerator, SequenceIds};
    use chrono::{TimeZone, Utc};

    #[test]
    fn clock_ids_are_monotonic_under_frozen_time() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let mut ids = ClockIds::default();
        let a = ids.next_id(now);
        let b = ids.next_id(now);
        assert_eq!(a, now.timestamp_millis().to_string());
        assert_eq!(b, (now.timestamp_millis() + 1).to_string());
    }

    #[test]
    fn sequence_ids_are_zero_padded() {
        let now = Utc::now();
        let mut ids = SequenceIds::starting_at(6);
        assert_eq!(ids.next_id(now), "006");
        assert_eq!(ids.next_id(now), "007");

        let mut wide = SequenceIds::starting_at(42).with_width(5);
        assert_eq!(wide.next_id(now), "00042");
    }
}
