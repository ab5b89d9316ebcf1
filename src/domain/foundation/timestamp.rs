//! UTC instants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// When something happened: a member joining a waiting list, a payment
/// being received. Calendar concepts such as membership validity use
/// `NaiveDate` instead.
///
/// Ordering is chronological, which is what waiting lists sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// `None` outside chrono's representable range.
    pub fn from_unix_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Shifts by `secs`, backwards when negative.
    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_lies_between_surrounding_clock_reads() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn ordering_follows_time() {
        let queued = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        let later = queued.plus_secs(30);
        let earlier = queued.plus_secs(-30);

        assert!(earlier < queued);
        assert!(queued < later);
        assert_eq!(later.plus_secs(-30), queued);
    }

    #[test]
    fn serializes_as_rfc3339() {
        let dt = DateTime::parse_from_rfc3339("2025-03-01T09:15:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let json = serde_json::to_string(&Timestamp::from(dt)).unwrap();
        assert_eq!(json, "\"2025-03-01T09:15:00Z\"");
    }
}
