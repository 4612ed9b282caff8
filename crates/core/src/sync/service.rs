//! Sync pipeline - core business logic
//!
//! One run is strictly sequential: authenticate, then fetch, then either
//! print or persist. No stage retries; the first error ends the run.

use std::future::Future;
use std::sync::Arc;

use calsync_domain::constants::GRAPH_DEFAULT_SCOPE;
use calsync_domain::{
    CalendarEvent, CalendarSummary, Credential, Principal, Result, RunMode, SyncError, TimeWindow,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::ports::{CalendarSource, CredentialProvider, EventSink};

/// Inputs of a single run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub mode: RunMode,
    /// Shared calendar mailbox; required by the dump and persist modes.
    pub mailbox: Option<String>,
    pub window: TimeWindow,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    LoginVerified(Principal),
    Calendars(Vec<CalendarSummary>),
    /// Events fetched for console output; nothing was written.
    Events(Vec<CalendarEvent>),
    Persisted { fetched: usize, persisted: usize },
}

/// Sequences credential exchange, calendar retrieval and persistence.
pub struct SyncPipeline {
    credentials: Arc<dyn CredentialProvider>,
    calendar: Arc<dyn CalendarSource>,
    sink: Option<Arc<dyn EventSink>>,
    credential: Credential,
}

impl SyncPipeline {
    /// Create a new pipeline without a sink; only the read-only modes can run
    /// until one is attached with [`SyncPipeline::with_sink`].
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        calendar: Arc<dyn CalendarSource>,
        credential: Credential,
    ) -> Self {
        Self { credentials, calendar, sink: None, credential }
    }

    /// Attach the store that the persist mode writes to.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Execute one run.
    ///
    /// Configuration problems are reported before any network or store call.
    /// Cancelling `cancel` aborts the in-flight stage with
    /// [`SyncError::Cancelled`]; rows already written stay written.
    #[instrument(skip(self, cancel), fields(mode = %request.mode))]
    pub async fn run(
        &self,
        request: &SyncRequest,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome> {
        let mailbox = if request.mode.requires_mailbox() {
            Some(required_mailbox(request.mailbox.as_deref())?)
        } else {
            None
        };
        let sink = match (request.mode, &self.sink) {
            (RunMode::Persist, None) => {
                return Err(SyncError::Config(
                    "database connection string is not configured".into(),
                ));
            }
            (RunMode::Persist, Some(sink)) => Some(Arc::clone(sink)),
            _ => None,
        };

        let token = guard(
            cancel,
            self.credentials.authenticate(&self.credential, &[GRAPH_DEFAULT_SCOPE]),
        )
        .await?;
        debug!(expires_at = ?token.expires_at(), "access token acquired");

        match (request.mode, mailbox, sink) {
            (RunMode::VerifyLogin, _, _) => {
                let principal = guard(cancel, self.calendar.current_principal(&token)).await?;
                info!(upn = ?principal.user_principal_name, "login verified");
                Ok(SyncOutcome::LoginVerified(principal))
            }
            (RunMode::ListCalendars, _, _) => {
                let calendars = guard(cancel, self.calendar.list_calendars(&token)).await?;
                info!(count = calendars.len(), "listed calendars for signed-in user");
                Ok(SyncOutcome::Calendars(calendars))
            }
            (RunMode::DumpToConsole, Some(mailbox), _) => {
                let events = guard(
                    cancel,
                    self.calendar.get_calendar_events(&token, mailbox, &request.window),
                )
                .await?;
                info!(mailbox, count = events.len(), "fetched events for console output");
                Ok(SyncOutcome::Events(events))
            }
            (RunMode::Persist, Some(mailbox), Some(sink)) => {
                let events = guard(
                    cancel,
                    self.calendar.get_calendar_events(&token, mailbox, &request.window),
                )
                .await?;
                // The token is not needed past the fetch.
                drop(token);

                let fetched = events.len();
                info!(mailbox, fetched, "fetched events, persisting");

                let persisted = guard(cancel, sink.persist_events(&events)).await?;
                info!(mailbox, fetched, persisted, "calendar sync completed");
                Ok(SyncOutcome::Persisted { fetched, persisted })
            }
            (mode, _, _) => {
                Err(SyncError::Config(format!("mode {mode} is missing a mailbox or sink")))
            }
        }
    }
}

fn required_mailbox(mailbox: Option<&str>) -> Result<&str> {
    match mailbox.map(str::trim) {
        Some(m) if !m.is_empty() => Ok(m),
        _ => Err(SyncError::Config("shared calendar email is not configured".into())),
    }
}

async fn guard<T>(
    cancel: &CancellationToken,
    stage: impl Future<Output = Result<T>>,
) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SyncError::Cancelled),
        result = stage => result,
    }
}
