//! Console rendering of run outcomes
//!
//! Writers are generic so tests can render into a buffer; the binary passes
//! a locked stdout.

use std::io::{self, Write};

use calsync_core::SyncOutcome;
use calsync_domain::{CalendarEvent, CalendarSummary, Principal};
use chrono::{DateTime, SecondsFormat, Utc};

/// Write the human-readable report for `outcome`.
pub fn render<W: Write>(out: &mut W, outcome: &SyncOutcome) -> io::Result<()> {
    match outcome {
        SyncOutcome::LoginVerified(principal) => render_principal(out, principal),
        SyncOutcome::Calendars(calendars) => render_calendars(out, calendars),
        SyncOutcome::Events(events) => render_events(out, events),
        SyncOutcome::Persisted { fetched, persisted } => {
            writeln!(out, "Fetched {fetched} event(s), inserted {persisted} row(s).")
        }
    }
}

fn render_principal<W: Write>(out: &mut W, principal: &Principal) -> io::Result<()> {
    writeln!(
        out,
        "Login successful. User: {} ({})",
        text(&principal.display_name),
        text(&principal.user_principal_name)
    )
}

fn render_calendars<W: Write>(out: &mut W, calendars: &[CalendarSummary]) -> io::Result<()> {
    if calendars.is_empty() {
        return writeln!(out, "No calendars found or insufficient permissions.");
    }

    writeln!(out, "Calendars visible to the login user:")?;
    for calendar in calendars {
        writeln!(out, "Name: {}, Id: {}", text(&calendar.name), calendar.id)?;
    }
    Ok(())
}

fn render_events<W: Write>(out: &mut W, events: &[CalendarEvent]) -> io::Result<()> {
    for event in events {
        writeln!(out, "Subject: {}", text(&event.subject))?;
        writeln!(out, "Start: {}", instant(event.start))?;
        writeln!(out, "End: {}", instant(event.end))?;
        writeln!(out, "Organizer: {}", text(&event.organizer_address))?;
        writeln!(out, "Location: {}", text(&event.location_display_name))?;
        writeln!(out, "BodyPreview: {}", text(&event.body_preview))?;
        writeln!(out, "---")?;
    }
    Ok(())
}

// Absent values print as nothing.
fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn instant(value: Option<DateTime<Utc>>) -> String {
    value.map(|v| v.to_rfc3339_opts(SecondsFormat::Secs, true)).unwrap_or_default()
}
