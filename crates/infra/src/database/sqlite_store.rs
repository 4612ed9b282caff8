//! SQLite-backed implementation of the EventSink port.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use calsync_core::EventSink;
use calsync_domain::{CalendarEvent, EventRow, Result, SyncError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ToSql};
use tokio::task;
use tracing::{debug, info, instrument};

use super::insert_statement;
use crate::errors::InfraError;

const SCHEMA_SQL: &str = include_str!("sqlite_schema.sql");

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteLocation {
    File(PathBuf),
    /// Private in-memory database; contents vanish when the call returns.
    Memory,
}

impl SqliteLocation {
    /// Parse `sqlite:<path>`, `sqlite://<path>` or `sqlite::memory:`.
    pub fn parse(connection_string: &str) -> Option<Self> {
        let rest = connection_string.trim().strip_prefix("sqlite:")?;
        if rest == ":memory:" {
            return Some(Self::Memory);
        }
        let path = rest.strip_prefix("//").unwrap_or(rest);
        if path.is_empty() {
            return None;
        }
        Some(Self::File(PathBuf::from(path)))
    }
}

/// Writes events with one connection per call.
pub struct SqliteEventStore {
    location: SqliteLocation,
    transactional: bool,
    ensure_schema: bool,
    busy_timeout: Duration,
}

impl SqliteEventStore {
    pub fn new(location: SqliteLocation) -> Self {
        Self {
            location,
            transactional: false,
            ensure_schema: false,
            busy_timeout: Duration::from_secs(30),
        }
    }

    /// Run the whole insert set in one transaction.
    pub fn transactional(mut self, enabled: bool) -> Self {
        self.transactional = enabled;
        self
    }

    /// Create the destination table when it is missing.
    pub fn ensure_schema(mut self, enabled: bool) -> Self {
        self.ensure_schema = enabled;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    fn open(location: &SqliteLocation, busy_timeout: Duration) -> Result<Connection> {
        let conn = match location {
            SqliteLocation::File(path) => Connection::open(path),
            SqliteLocation::Memory => Connection::open_in_memory(),
        }
        .map_err(InfraError::from)?;
        conn.busy_timeout(busy_timeout).map_err(InfraError::from)?;
        Ok(conn)
    }
}

#[async_trait]
impl EventSink for SqliteEventStore {
    #[instrument(skip(self, events), fields(count = events.len(), transactional = self.transactional))]
    async fn persist_events(&self, events: &[CalendarEvent]) -> Result<usize> {
        let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();
        let location = self.location.clone();
        let busy_timeout = self.busy_timeout;
        let transactional = self.transactional;
        let ensure_schema = self.ensure_schema;

        let written = task::spawn_blocking(move || -> Result<usize> {
            let mut conn = Self::open(&location, busy_timeout)?;
            debug!(location = ?location, "sqlite connection opened");

            if ensure_schema {
                conn.execute_batch(SCHEMA_SQL).map_err(InfraError::from)?;
            }

            if transactional {
                let tx = conn.transaction().map_err(InfraError::from)?;
                let written = insert_rows(&tx, &rows)?;
                tx.commit().map_err(InfraError::from)?;
                Ok(written)
            } else {
                insert_rows(&conn, &rows)
            }
        })
        .await
        .map_err(map_join_error)??;

        info!(written, "events persisted to sqlite");
        Ok(written)
    }
}

fn insert_rows(conn: &Connection, rows: &[EventRow]) -> Result<usize> {
    let sql = insert_statement(|i| format!("?{i}"));
    let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;

    for (index, row) in rows.iter().enumerate() {
        let start = row.start_time.map(format_timestamp);
        let end = row.end_time.map(format_timestamp);

        stmt.execute(
            [
                &row.subject as &dyn ToSql,
                &start,
                &end,
                &row.organizer,
                &row.location,
                &row.body_preview,
            ]
            .as_ref(),
        )
        .map_err(|e| {
            let err: SyncError = InfraError::from(e).into();
            SyncError::Persist(format!("insert of event {} failed: {}", index + 1, err.message()))
        })?;
    }

    Ok(rows.len())
}

/// Fixed-width RFC 3339 so stored values sort lexically.
fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn map_join_error(err: task::JoinError) -> SyncError {
    SyncError::Persist(format!("sqlite task join error: {err}"))
}
