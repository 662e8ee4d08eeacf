//! Incident timestamps as they appear in the persisted collection.
//!
//! Two textual shapes coexist in stored data: RFC 3339 values with an offset
//! (`2024-01-15T10:30:00.000Z`, written for every incident registered through
//! the store) and floating wall-clock values without an offset
//! (`2024-01-15T10:30:00`, used by the seed set). A parsed [`Timestamp`]
//! remembers how it was written and is encoded back the same way, down to
//! the fraction digits and `Z` versus `+00:00`.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDateTime, SubsecRound, Timelike, Utc,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const FLOATING_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A point in time attached to an incident or history entry.
#[derive(Debug, Clone, Copy)]
pub enum Timestamp {
    /// Carries an explicit UTC offset.
    Zoned(DateTime<FixedOffset>, TextShape),
    /// Wall-clock time without an offset; treated as UTC when an instant is needed.
    Floating(NaiveDateTime, TextShape),
}

/// How a timestamp was spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextShape {
    seconds: bool,
    fraction_digits: u8,
    zulu: bool,
}

impl TextShape {
    /// Seconds always, the fraction only as wide as `nanos` needs.
    fn fitting(nanos: u32) -> Self {
        let fraction_digits = match nanos {
            0 => 0,
            n if n % 1_000_000 == 0 => 3,
            n if n % 1_000 == 0 => 6,
            _ => 9,
        };
        Self {
            seconds: true,
            fraction_digits,
            zulu: true,
        }
    }

    fn of(text: &str) -> Self {
        let time = text.split_once(['T', 't', ' ']).map_or("", |(_, time)| time);
        let clock = time.split(['Z', 'z', '+', '-']).next().unwrap_or(time);
        let (hms, fraction) = clock.split_once('.').unwrap_or((clock, ""));
        Self {
            seconds: hms.matches(':').count() >= 2,
            fraction_digits: u8::try_from(fraction.len().min(9)).unwrap_or(9),
            zulu: time.ends_with(['Z', 'z']),
        }
    }

    fn write_clock(self, f: &mut fmt::Formatter<'_>, naive: &NaiveDateTime) -> fmt::Result {
        write!(f, "{}", naive.format("%Y-%m-%dT%H:%M"))?;
        if self.seconds || self.fraction_digits > 0 {
            write!(f, ":{:02}", naive.second())?;
        }
        if self.fraction_digits > 0 {
            let nanos = format!("{:09}", naive.nanosecond() % 1_000_000_000);
            write!(f, ".{}", &nanos[..usize::from(self.fraction_digits)])?;
        }
        Ok(())
    }
}

/// Error returned when a timestamp string matches neither accepted shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{0}': expected ISO-8601 date-time")]
pub struct TimestampError(pub String);

impl Timestamp {
    /// Stamp a UTC instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    #[must_use]
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self::Zoned(
            instant.trunc_subsecs(3).fixed_offset(),
            TextShape {
                seconds: true,
                fraction_digits: 3,
                zulu: true,
            },
        )
    }

    /// A floating wall-clock value written with seconds.
    #[must_use]
    pub fn floating(naive: NaiveDateTime) -> Self {
        Self::Floating(naive, TextShape::fitting(naive.nanosecond()))
    }

    /// The instant this timestamp denotes.
    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            Self::Zoned(dt, _) => dt.with_timezone(&Utc),
            Self::Floating(naive, _) => naive.and_utc(),
        }
    }

    /// Calendar year of the recorded wall-clock time.
    #[must_use]
    pub fn year(&self) -> i32 {
        match self {
            Self::Zoned(dt, _) => dt.year(),
            Self::Floating(naive, _) => naive.year(),
        }
    }

    /// Calendar month (1-12) of the recorded wall-clock time.
    #[must_use]
    pub fn month(&self) -> u32 {
        match self {
            Self::Zoned(dt, _) => dt.month(),
            Self::Floating(naive, _) => naive.month(),
        }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant().cmp(&other.instant())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(dt, shape) => {
                shape.write_clock(f, &dt.naive_local())?;
                if shape.zulu && dt.offset().local_minus_utc() == 0 {
                    f.write_str("Z")
                } else {
                    write!(f, "{}", dt.format("%:z"))
                }
            }
            Self::Floating(naive, shape) => shape.write_clock(f, naive),
        }
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let shape = TextShape::of(trimmed);
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::Zoned(dt, shape));
        }
        FLOATING_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .map(|naive| Self::Floating(naive, shape))
            .ok_or_else(|| TimestampError(s.to_string()))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Timestamp;
    use chrono::{TimeZone, Utc};

    #[test]
    fn floating_text_roundtrips_unchanged() {
        let ts: Timestamp = "2024-01-15T10:30:00".parse().unwrap();
        assert!(matches!(ts, Timestamp::Floating(..)));
        assert_eq!(ts.to_string(), "2024-01-15T10:30:00");
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 1);
    }

    #[test]
    fn zoned_text_keeps_millis_and_z_suffix() {
        let ts: Timestamp = "2024-03-02T08:15:42.123Z".parse().unwrap();
        assert!(matches!(ts, Timestamp::Zoned(..)));
        assert_eq!(ts.to_string(), "2024-03-02T08:15:42.123Z");
    }

    #[test]
    fn offset_and_precision_are_kept() {
        for text in [
            "2024-01-15T09:15:00+00:00",
            "2024-01-15T09:15:00.000Z",
            "2024-01-15T09:15:00Z",
            "2024-01-15T04:15:00.5-05:00",
            "2024-01-15T09:15",
            "2024-01-15T09:15:00.000",
        ] {
            let ts: Timestamp = text.parse().unwrap();
            assert_eq!(ts.to_string(), text);
        }
    }

    #[test]
    fn from_utc_writes_millis_even_when_zero() {
        let ts = Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
        assert_eq!(ts.to_string(), "2024-05-06T07:08:09.000Z");
    }

    #[test]
    fn from_utc_truncates_to_millis() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
            + chrono::Duration::microseconds(123_456);
        let ts = Timestamp::from_utc(instant);
        assert_eq!(ts.to_string(), "2024-05-06T07:08:09.123Z");
    }

    #[test]
    fn floating_and_zoned_compare_as_instants() {
        let floating: Timestamp = "2024-01-15T10:30:00".parse().unwrap();
        let zoned: Timestamp = "2024-01-15T10:30:00Z".parse().unwrap();
        let later: Timestamp = "2024-01-15T06:00:00-05:00".parse().unwrap();
        assert_eq!(floating, zoned);
        assert!(later > zoned);
    }

    #[test]
    fn month_uses_recorded_wall_clock() {
        let ts: Timestamp = "2024-01-31T23:30:00-05:00".parse().unwrap();
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.instant().format("%m").to_string(), "02");
    }

    #[test]
    fn rejects_garbage() {
        assert!("yesterday".parse::<Timestamp>().is_err());
        assert!(serde_json::from_str::<Timestamp>("\"15/01/2024\"").is_err());
    }
}
