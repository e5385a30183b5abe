//! Occurrences and time windows.
//!
//! All timestamps are `i64` seconds since the Unix epoch. Conversions from
//! `chrono` datetimes are provided for callers that work in `DateTime<Utc>`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FreeBusyError, Result};
use crate::status::BusyStatus;

/// A single calendar item's effective busy interval.
///
/// `end >= start` is not guaranteed by upstream data. The merger accepts
/// zero and negative length occurrences without failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub subject: String,
    pub status: BusyStatus,
}

impl Occurrence {
    pub fn new(start: i64, end: i64, subject: impl Into<String>, status: BusyStatus) -> Self {
        Self {
            start,
            end,
            subject: subject.into(),
            status,
        }
    }

    pub fn from_datetimes(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        subject: impl Into<String>,
        status: BusyStatus,
    ) -> Self {
        Self::new(start.timestamp(), end.timestamp(), subject, status)
    }
}

/// A closed time window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// # Errors
    /// Returns `FreeBusyError::InvalidWindow` if `start > end`.
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if start > end {
            return Err(FreeBusyError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        Self::new(start.timestamp(), end.timestamp())
    }

    /// Window beginning `lookback_days` before `now` and extending
    /// `length_days` past that point.
    pub fn starting_at(now: DateTime<Utc>, lookback_days: u32, length_days: u32) -> Self {
        let start = now - Duration::days(i64::from(lookback_days));
        let end = start + Duration::days(i64::from(length_days));
        Self {
            start: start.timestamp(),
            end: end.timestamp(),
        }
    }

    /// Closed intersection test: an interval touching either edge counts.
    pub fn intersects(&self, start: i64, end: i64) -> bool {
        start <= self.end && end >= self.start
    }

    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start, 0)
    }

    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.end, 0)
    }
}
