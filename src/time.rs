use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, TimeZone as _, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Last timestamp handed out by [now], in nanoseconds since the epoch.
static LAST_ISSUED: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current time, strictly greater than every timestamp previously returned by this function.
///
/// Snapshots and history entries are ordered by their timestamp, so two records written within
/// the same clock tick must still compare in the order they were created.
pub fn now() -> Timestamp {
    let wall = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);

    let previous = LAST_ISSUED
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(wall.max(last.saturating_add(1)))
        })
        .unwrap_or(wall);

    let issued = wall.max(previous.saturating_add(1));
    Timestamp(Utc.timestamp_nanos(issued))
}

/// A UTC timestamp that is stored as a native datetime in the database so that `ORDER BY` works
/// chronologically rather than lexically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, new)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Formats the timestamp in local time the way activity log lines expect it.
    pub fn log_format(&self) -> String {
        self.0.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        surrealdb::sql::Datetime::from(self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let datetime = surrealdb::sql::Datetime::deserialize(deserializer)?;
        Ok(Self(datetime.0))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamps_are_strictly_increasing() {
        let issued: Vec<Timestamp> = (0..1_000).map(|_| now()).collect();

        for pair in issued.windows(2) {
            assert!(
                pair[0] < pair[1],
                "every timestamp must be later than the one before it"
            );
        }
    }

    #[test]
    fn log_format_uses_local_time_with_second_precision() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let local = utc.with_timezone(&Local).naive_local();

        let formatted = Timestamp::new(utc).log_format();
        assert_eq!(formatted.len(), 19);
        assert_eq!(
            chrono::NaiveDateTime::parse_from_str(&formatted, "%Y-%m-%d %H:%M:%S").unwrap(),
            local
        );
    }
}
