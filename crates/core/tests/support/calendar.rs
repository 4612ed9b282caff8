use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calsync_core::CalendarSource;
use calsync_domain::{
    AccessToken, CalendarEvent, CalendarSummary, Principal, Result as DomainResult, SyncError,
    TimeWindow,
};

/// In-memory calendar provider.
///
/// Serves a fixed set of events, calendars and a principal. Records each call
/// by name (`events:<mailbox>`, `calendars`, `principal`).
#[derive(Clone, Default)]
pub struct MockCalendarSource {
    events: Arc<Mutex<Vec<CalendarEvent>>>,
    calendars: Vec<CalendarSummary>,
    failure: Option<SyncError>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCalendarSource {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events: Arc::new(Mutex::new(events)), ..Self::default() }
    }

    pub fn failing(message: &str) -> Self {
        Self { failure: Some(SyncError::Calendar(message.to_string())), ..Self::default() }
    }

    pub fn with_calendars(mut self, calendars: Vec<CalendarSummary>) -> Self {
        self.calendars = calendars;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> DomainResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CalendarSource for MockCalendarSource {
    async fn get_calendar_events(
        &self,
        _token: &AccessToken,
        mailbox: &str,
        window: &TimeWindow,
    ) -> DomainResult<Vec<CalendarEvent>> {
        self.record(format!("events:{mailbox}"))?;
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.start.map_or(true, |start| window.contains(start)))
            .cloned()
            .collect())
    }

    async fn list_calendars(&self, _token: &AccessToken) -> DomainResult<Vec<CalendarSummary>> {
        self.record("calendars".into())?;
        Ok(self.calendars.clone())
    }

    async fn current_principal(&self, _token: &AccessToken) -> DomainResult<Principal> {
        self.record("principal".into())?;
        Ok(Principal {
            display_name: Some("Sync Service".into()),
            user_principal_name: Some("svc@contoso.com".into()),
        })
    }
}
