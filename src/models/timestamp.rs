use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Raw ISO-8601 timestamp exactly as it appears on a log line.
///
/// Two views are derived from the same raw value and must not be confused:
/// the UTC instant (used for elapsed-time arithmetic) and the local calendar
/// fields (used for day/hour/weekday bucketing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

/// Calendar position of an instant in a particular time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendarFields {
    pub date: NaiveDate,
    /// 0..=23
    pub hour: u32,
    /// 0..=6, Monday = 0
    pub weekday: u32,
}

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as a UTC instant. A trailing `Z` and explicit offsets are both accepted.
    pub fn to_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.0.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Convert to calendar fields in `tz` (normally `chrono::Local`).
    pub fn to_local_calendar_fields<Tz: TimeZone>(&self, tz: &Tz) -> Option<LocalCalendarFields> {
        let local = self.to_instant()?.with_timezone(tz);
        Some(LocalCalendarFields {
            date: local.date_naive(),
            hour: local.hour(),
            weekday: local.weekday().num_days_from_monday(),
        })
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
