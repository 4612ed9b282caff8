//! Application context - dependency injection container

use std::sync::Arc;

use calsync_core::{SyncOutcome, SyncPipeline, SyncRequest};
use calsync_domain::{Config, Result, RunMode, SyncError, TimeWindow};
use calsync_infra::{
    open_event_sink, GraphCalendarClient, GraphClientOptions, HttpClient, PasswordGrantProvider,
};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Everything one invocation needs: the wired pipeline and the request it
/// will run.
pub struct AppContext {
    pipeline: SyncPipeline,
    request: SyncRequest,
}

impl AppContext {
    /// Wire the infra adapters for `config`, anchoring the time window at
    /// the current instant.
    pub fn new(config: &Config) -> Result<Self> {
        Self::at(config, Utc::now())
    }

    /// Same as [`AppContext::new`] with an explicit anchor instant.
    ///
    /// No network or store connection is opened here. The event store is
    /// only attached in persist mode, and only when a connection string is
    /// configured; the pipeline reports the missing one itself.
    pub fn at(config: &Config, now: DateTime<Utc>) -> Result<Self> {
        let mode = RunMode::from_flags(&config.debug);
        let credential = config.graph.credential()?;
        let window =
            TimeWindow::around(now, config.calendar.months_before, config.calendar.months_after)?;

        let http = HttpClient::from_config(&config.http)
            .map_err(|e| SyncError::Config(format!("invalid HTTP settings: {e}")))?;
        let credentials = PasswordGrantProvider::new(http.clone(), &config.graph.authority_host)?;
        let options = GraphClientOptions::from_config(&config.graph, &config.calendar)?;
        let calendar = GraphCalendarClient::new(http, options);

        let mut pipeline = SyncPipeline::new(Arc::new(credentials), Arc::new(calendar), credential);
        if mode == RunMode::Persist && !config.database.connection_string.trim().is_empty() {
            pipeline = pipeline.with_sink(open_event_sink(&config.database)?);
        }

        let mailbox = Some(config.calendar.shared_calendar_email.clone())
            .filter(|m| !m.trim().is_empty());

        debug!(
            %mode,
            window_start = %window.start_param(),
            window_end = %window.end_param(),
            "application context ready"
        );

        Ok(Self { pipeline, request: SyncRequest { mode, mailbox, window } })
    }

    pub fn mode(&self) -> RunMode {
        self.request.mode
    }

    pub fn request(&self) -> &SyncRequest {
        &self.request
    }

    /// Execute the configured run.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<SyncOutcome> {
        info!(mode = %self.request.mode, "starting calendar sync run");
        self.pipeline.run(&self.request, cancel).await
    }
}
