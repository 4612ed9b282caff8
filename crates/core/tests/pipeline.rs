//! Behaviour of the sync pipeline against mocked ports.

mod support;

use std::sync::Arc;
use std::time::Duration;

use calsync_core::{SyncOutcome, SyncPipeline};
use calsync_domain::constants::GRAPH_DEFAULT_SCOPE;
use calsync_domain::{CalendarEvent, CalendarSummary, RunMode, SyncError};
use chrono::{TimeZone, Utc};
use support::{pipeline, request, MockCalendarSource, MockCredentialProvider, MockEventSink};
use tokio_util::sync::CancellationToken;

const MAILBOX: &str = "room-101@contoso.com";

fn event(subject: &str, day: u32) -> CalendarEvent {
    CalendarEvent {
        subject: Some(subject.to_string()),
        start: Some(Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap()),
        end: Some(Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap()),
        organizer_address: Some("alice@contoso.com".into()),
        location_display_name: Some("Room 101".into()),
        body_preview: Some("Agenda".into()),
    }
}

#[tokio::test]
async fn persist_writes_every_fetched_event() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::new(vec![event("Standup", 3), event("Retro", 14)]);
    let sink = MockEventSink::new();

    let outcome = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::Persist, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Persisted { fetched: 2, persisted: 2 });
    assert_eq!(sink.rows(), vec![event("Standup", 3), event("Retro", 14)]);
    assert_eq!(calendar.calls(), vec![format!("events:{MAILBOX}")]);
    assert_eq!(auth.requested_scopes(), vec![vec![GRAPH_DEFAULT_SCOPE.to_string()]]);
}

#[tokio::test]
async fn empty_calendar_still_opens_the_sink() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::new(Vec::new());
    let sink = MockEventSink::new();

    let outcome = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::Persist, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Persisted { fetched: 0, persisted: 0 });
    assert_eq!(sink.invocations(), 1);
    assert!(sink.rows().is_empty());
}

#[tokio::test]
async fn duplicate_events_are_persisted_twice() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::new(vec![event("Standup", 3), event("Standup", 3)]);
    let sink = MockEventSink::new();

    let outcome = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::Persist, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Persisted { fetched: 2, persisted: 2 });
    assert_eq!(sink.rows().len(), 2);
}

#[tokio::test]
async fn calendar_failure_never_reaches_the_sink() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::failing("ErrorAccessDenied: Access is denied.");
    let sink = MockEventSink::new();

    let err = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::Persist, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "calendar");
    assert!(err.message().contains("ErrorAccessDenied"));
    assert_eq!(sink.invocations(), 0);
}

#[tokio::test]
async fn auth_failure_stops_before_any_calendar_call() {
    let auth = MockCredentialProvider::failing("invalid_grant: AADSTS50126");
    let calendar = MockCalendarSource::new(vec![event("Standup", 3)]);
    let sink = MockEventSink::new();

    let err = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::Persist, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Auth(_)));
    assert!(calendar.calls().is_empty());
    assert_eq!(sink.invocations(), 0);
}

#[tokio::test]
async fn missing_mailbox_is_rejected_before_authentication() {
    for mailbox in [None, Some(""), Some("   ")] {
        let auth = MockCredentialProvider::new();
        let calendar = MockCalendarSource::new(Vec::new());
        let sink = MockEventSink::new();

        let err = pipeline(&auth, &calendar, &sink)
            .run(&request(RunMode::Persist, mailbox), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Config(_)), "{mailbox:?} gave {err:?}");
        assert_eq!(auth.calls(), 0);
        assert!(calendar.calls().is_empty());
    }
}

#[tokio::test]
async fn persist_without_a_sink_is_rejected_before_authentication() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::new(vec![event("Standup", 3)]);
    let pipeline =
        SyncPipeline::new(Arc::new(auth.clone()), Arc::new(calendar.clone()), support::credential());

    let err = pipeline
        .run(&request(RunMode::Persist, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), "config");
    assert_eq!(auth.calls(), 0);

    // Read-only modes do not need one.
    let outcome = pipeline
        .run(&request(RunMode::DumpToConsole, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, SyncOutcome::Events(vec![event("Standup", 3)]));
}

#[tokio::test]
async fn mailbox_is_trimmed_before_use() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::new(Vec::new());
    let sink = MockEventSink::new();

    pipeline(&auth, &calendar, &sink)
        .run(
            &request(RunMode::DumpToConsole, Some("  room-101@contoso.com ")),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(calendar.calls(), vec![format!("events:{MAILBOX}")]);
}

#[tokio::test]
async fn dump_returns_events_without_persisting() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::new(vec![event("Standup", 3)]);
    let sink = MockEventSink::new();

    let outcome = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::DumpToConsole, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Events(vec![event("Standup", 3)]));
    assert_eq!(sink.invocations(), 0);
}

#[tokio::test]
async fn verify_login_needs_no_mailbox() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::new(Vec::new());
    let sink = MockEventSink::new();

    let outcome = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::VerifyLogin, None), &CancellationToken::new())
        .await
        .unwrap();

    match outcome {
        SyncOutcome::LoginVerified(principal) => {
            assert_eq!(principal.user_principal_name.as_deref(), Some("svc@contoso.com"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(calendar.calls(), vec!["principal".to_string()]);
    assert_eq!(sink.invocations(), 0);
}

#[tokio::test]
async fn list_calendars_reports_signed_in_users_calendars() {
    let auth = MockCredentialProvider::new();
    let calendars = vec![
        CalendarSummary { name: Some("Calendar".into()), id: "AAMkAD1".into() },
        CalendarSummary { name: None, id: "AAMkAD2".into() },
    ];
    let calendar = MockCalendarSource::new(Vec::new()).with_calendars(calendars.clone());
    let sink = MockEventSink::new();

    let outcome = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::ListCalendars, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Calendars(calendars));
    assert_eq!(calendar.calls(), vec!["calendars".to_string()]);
}

#[tokio::test]
async fn partial_sink_failure_keeps_earlier_rows() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::new(vec![
        event("One", 3),
        event("Two", 4),
        event("Three", 5),
    ]);
    let sink = MockEventSink::fail_after(2);

    let err = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::Persist, Some(MAILBOX)), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Persist(_)));
    assert_eq!(sink.rows().len(), 2);
}

#[tokio::test]
async fn cancellation_before_start_skips_every_stage() {
    let auth = MockCredentialProvider::new();
    let calendar = MockCalendarSource::new(vec![event("Standup", 3)]);
    let sink = MockEventSink::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::Persist, Some(MAILBOX)), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err, SyncError::Cancelled);
    assert_eq!(auth.calls(), 0);
    assert_eq!(sink.invocations(), 0);
}

#[tokio::test]
async fn cancellation_interrupts_in_flight_authentication() {
    let auth = MockCredentialProvider::slow(Duration::from_secs(30));
    let calendar = MockCalendarSource::new(vec![event("Standup", 3)]);
    let sink = MockEventSink::new();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = pipeline(&auth, &calendar, &sink)
        .run(&request(RunMode::Persist, Some(MAILBOX)), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err, SyncError::Cancelled);
    assert_eq!(auth.calls(), 1);
    assert!(calendar.calls().is_empty());
}
