use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{SecondsFormat, TimeZone, Utc};

/// Seconds for 0001-01-01T00:00:00Z, the earliest instant the backend
/// accepts in a timestamp field.
pub const MIN_TIMESTAMP_SECONDS: i64 = -62_135_596_800;
/// Seconds for 9999-12-31T23:59:59Z, the latest accepted instant
/// (nanoseconds may extend it up to .999999999).
pub const MAX_TIMESTAMP_SECONDS: i64 = 253_402_300_799;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        let mut timestamp = Self { seconds, nanos };
        timestamp.normalize();
        timestamp
    }

    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| Duration::from_secs(0));
        Self {
            seconds: duration.as_secs() as i64,
            nanos: duration.subsec_nanos() as i32,
        }
    }

    /// Whether the instant falls within the representable range
    /// (years 1 through 9999).
    pub fn in_range(&self) -> bool {
        (MIN_TIMESTAMP_SECONDS..=MAX_TIMESTAMP_SECONDS).contains(&self.seconds)
    }

    /// Total microseconds since the Unix epoch, truncating sub-microsecond
    /// precision toward negative infinity.
    pub fn to_unix_micros(&self) -> i64 {
        self.seconds * 1_000_000 + (self.nanos / 1_000) as i64
    }

    pub fn to_unix_millis(&self) -> i64 {
        self.seconds * 1_000 + (self.nanos / 1_000_000) as i64
    }

    pub fn from_unix_micros(micros: i64) -> Self {
        Self::new(
            micros.div_euclid(1_000_000),
            (micros.rem_euclid(1_000_000) * 1_000) as i32,
        )
    }

    pub fn from_unix_millis(millis: i64) -> Self {
        Self::new(
            millis.div_euclid(1_000),
            (millis.rem_euclid(1_000) * 1_000_000) as i32,
        )
    }

    fn normalize(&mut self) {
        let extra_seconds = self.nanos.div_euclid(1_000_000_000);
        self.seconds += extra_seconds as i64;
        self.nanos = self.nanos.rem_euclid(1_000_000_000);
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match Utc.timestamp_opt(self.seconds, self.nanos as u32).single() {
            Some(datetime) => {
                write!(f, "{}", datetime.to_rfc3339_opts(SecondsFormat::Nanos, true))
            }
            None => write!(f, "time({},{})", self.seconds, self.nanos),
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.seconds.cmp(&other.seconds) {
            Ordering::Equal => self.nanos.cmp(&other.nanos),
            ordering => ordering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_nanoseconds() {
        let timestamp = Timestamp::new(1, 1_500_000_000);
        assert_eq!(timestamp.seconds, 2);
        assert_eq!(timestamp.nanos, 500_000_000);
    }

    #[test]
    fn normalize_negative_nanoseconds() {
        let timestamp = Timestamp::new(1, -500_000_000);
        assert_eq!(timestamp.seconds, 0);
        assert_eq!(timestamp.nanos, 500_000_000);
    }

    #[test]
    fn ordering() {
        let earlier = Timestamp::new(1, 0);
        let later = Timestamp::new(2, 0);
        assert!(earlier < later);
    }

    #[test]
    fn range_bounds() {
        assert!(Timestamp::new(0, 0).in_range());
        assert!(Timestamp::new(MAX_TIMESTAMP_SECONDS, 999_999_999).in_range());
        assert!(!Timestamp::new(MAX_TIMESTAMP_SECONDS + 1, 0).in_range());
        assert!(!Timestamp::new(MIN_TIMESTAMP_SECONDS - 1, 0).in_range());
    }

    #[test]
    fn micros_round_trip() {
        let timestamp = Timestamp::new(1_672_531_200, 123_000);
        assert_eq!(
            Timestamp::from_unix_micros(timestamp.to_unix_micros()),
            timestamp
        );
        let negative = Timestamp::from_unix_micros(-1);
        assert_eq!(negative.seconds, -1);
        assert_eq!(negative.nanos, 999_999_000);
    }

    #[test]
    fn renders_rfc3339() {
        let timestamp = Timestamp::new(0, 0);
        assert_eq!(format!("{timestamp}"), "1970-01-01T00:00:00.000000000Z");
    }
}
