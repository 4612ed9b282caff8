//! Shared test helpers for `calsync-core` integration tests.
//!
//! Lightweight mocks for the three pipeline ports. Each one records the calls
//! it receives so tests can assert on what the pipeline did and did not do.

#![allow(dead_code)]

pub mod auth;
pub mod calendar;
pub mod sink;

use std::sync::Arc;

use calsync_core::{SyncPipeline, SyncRequest};
use calsync_domain::{Credential, RunMode, TimeWindow};
use chrono::{TimeZone, Utc};

pub use auth::MockCredentialProvider;
pub use calendar::MockCalendarSource;
pub use sink::MockEventSink;

pub fn credential() -> Credential {
    Credential::new("client-id", "tenant-id", "svc@contoso.com", "hunter2")
        .expect("valid credential")
}

pub fn window() -> TimeWindow {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
    TimeWindow::around(now, 1, 1).expect("valid window")
}

pub fn request(mode: RunMode, mailbox: Option<&str>) -> SyncRequest {
    SyncRequest { mode, mailbox: mailbox.map(str::to_string), window: window() }
}

pub fn pipeline(
    auth: &MockCredentialProvider,
    calendar: &MockCalendarSource,
    sink: &MockEventSink,
) -> SyncPipeline {
    SyncPipeline::new(Arc::new(auth.clone()), Arc::new(calendar.clone()), credential())
        .with_sink(Arc::new(sink.clone()))
}
