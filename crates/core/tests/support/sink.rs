use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calsync_core::EventSink;
use calsync_domain::{CalendarEvent, Result as DomainResult, SyncError};

/// Event sink that keeps written rows in memory.
///
/// `fail_after` makes the sink accept that many rows and then fail, leaving
/// the accepted rows in place like a non-transactional store would.
#[derive(Clone, Default)]
pub struct MockEventSink {
    rows: Arc<Mutex<Vec<CalendarEvent>>>,
    invocations: Arc<Mutex<usize>>,
    fail_after: Option<usize>,
}

impl MockEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_after(rows: usize) -> Self {
        Self { fail_after: Some(rows), ..Self::default() }
    }

    pub fn rows(&self) -> Vec<CalendarEvent> {
        self.rows.lock().unwrap().clone()
    }

    pub fn invocations(&self) -> usize {
        *self.invocations.lock().unwrap()
    }
}

#[async_trait]
impl EventSink for MockEventSink {
    async fn persist_events(&self, events: &[CalendarEvent]) -> DomainResult<usize> {
        *self.invocations.lock().unwrap() += 1;

        let mut rows = self.rows.lock().unwrap();
        for (index, event) in events.iter().enumerate() {
            if self.fail_after == Some(index) {
                return Err(SyncError::Persist(format!("insert failed at row {index}")));
            }
            rows.push(event.clone());
        }
        Ok(events.len())
    }
}
