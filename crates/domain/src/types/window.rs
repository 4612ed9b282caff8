//! Time window for calendar view queries

use chrono::{DateTime, Months, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SyncError};

/// Inclusive `[start, end]` window of UTC instants. `start <= end` always
/// holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(SyncError::Config(format!(
                "time window start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Window from `now - months_before` to `now + months_after`.
    ///
    /// Calendar-month arithmetic: days past the end of a shorter month clamp
    /// to its last day (2024-03-31 minus one month is 2024-02-29).
    pub fn around(now: DateTime<Utc>, months_before: u32, months_after: u32) -> Result<Self> {
        let start = now.checked_sub_months(Months::new(months_before)).ok_or_else(|| {
            SyncError::Config(format!("months_before={months_before} is out of range"))
        })?;
        let end = now.checked_add_months(Months::new(months_after)).ok_or_else(|| {
            SyncError::Config(format!("months_after={months_after} is out of range"))
        })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Round-trip (RFC 3339) rendering of the start, as sent on the wire.
    pub fn start_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }

    /// Round-trip (RFC 3339) rendering of the end, as sent on the wire.
    pub fn end_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}
