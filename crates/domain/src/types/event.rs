//! Calendar event and its storage projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Calendar event as returned by the provider's calendar view.
///
/// Every field is independently optional. There is no identity field, so two
/// events with identical content are indistinguishable and persisted twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub subject: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub organizer_address: Option<String>,
    pub location_display_name: Option<String>,
    pub body_preview: Option<String>,
}

impl CalendarEvent {
    /// Whether the event's start lies inside `[start, end]` (inclusive).
    ///
    /// Events without a start are never contained.
    pub fn starts_within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start.is_some_and(|s| s >= start && s <= end)
    }
}

/// Row written to the `CalendarEvents` table.
///
/// Column order matches [`crate::constants::EVENTS_COLUMNS`]. `None` is bound
/// as SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub subject: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub organizer: Option<String>,
    pub location: Option<String>,
    pub body_preview: Option<String>,
}

impl From<&CalendarEvent> for EventRow {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            subject: event.subject.clone(),
            start_time: event.start,
            end_time: event.end,
            organizer: event.organizer_address.clone(),
            location: event.location_display_name.clone(),
            body_preview: event.body_preview.clone(),
        }
    }
}
