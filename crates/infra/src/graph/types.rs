//! Graph wire types and their normalisation into domain types

use std::str::FromStr;

use calsync_domain::{CalendarEvent, CalendarSummary, Principal, Result, SyncError};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

/// One page of an OData collection.
#[derive(Debug, Deserialize)]
pub(crate) struct ODataPage<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ODataErrorBody {
    pub error: ODataError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ODataError {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ODataError {
    pub fn describe(&self) -> String {
        match (self.code.as_deref(), self.message.as_deref()) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(code), None) => code.to_string(),
            (None, Some(message)) => message.to_string(),
            (None, None) => "unspecified Graph error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphEvent {
    pub subject: Option<String>,
    pub body_preview: Option<String>,
    pub start: Option<DateTimeTimeZone>,
    pub end: Option<DateTimeTimeZone>,
    pub organizer: Option<Recipient>,
    pub location: Option<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DateTimeTimeZone {
    pub date_time: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Recipient {
    pub email_address: Option<EmailAddress>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailAddress {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Location {
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphCalendar {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphUser {
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
}

impl GraphEvent {
    pub fn into_domain(self) -> Result<CalendarEvent> {
        Ok(CalendarEvent {
            subject: self.subject,
            start: self.start.as_ref().map(DateTimeTimeZone::to_utc).transpose()?.flatten(),
            end: self.end.as_ref().map(DateTimeTimeZone::to_utc).transpose()?.flatten(),
            organizer_address: self
                .organizer
                .and_then(|o| o.email_address)
                .and_then(|e| e.address),
            location_display_name: self.location.and_then(|l| l.display_name),
            body_preview: self.body_preview,
        })
    }
}

impl From<GraphCalendar> for CalendarSummary {
    fn from(calendar: GraphCalendar) -> Self {
        Self { name: calendar.name, id: calendar.id }
    }
}

impl From<GraphUser> for Principal {
    fn from(user: GraphUser) -> Self {
        Self { display_name: user.display_name, user_principal_name: user.user_principal_name }
    }
}

impl DateTimeTimeZone {
    /// Resolve to a UTC instant.
    ///
    /// Offset-bearing values are taken as-is. Naive values are read in the
    /// reported zone, defaulting to UTC. A missing `dateTime` yields `None`.
    pub fn to_utc(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.date_time.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(instant.with_timezone(&Utc)));
        }

        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|e| SyncError::Calendar(format!("invalid event time '{raw}': {e}")))?;

        let zone = self.time_zone.as_deref().map(str::trim).unwrap_or("UTC");
        if zone.is_empty() || zone.eq_ignore_ascii_case("utc") {
            return Ok(Some(naive.and_utc()));
        }

        let tz = Tz::from_str(zone)
            .map_err(|_| SyncError::Calendar(format!("unrecognised time zone '{zone}'")))?;
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|local| Some(local.with_timezone(&Utc)))
            .ok_or_else(|| {
                SyncError::Calendar(format!("event time '{raw}' does not exist in zone '{zone}'"))
            })
    }
}
