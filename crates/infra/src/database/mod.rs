//! Relational event stores
//!
//! The backend is chosen from the connection string: `sqlite:` prefixes go to
//! [`SqliteEventStore`], everything else is handed to the PostgreSQL parser.

pub mod postgres_store;
pub mod sqlite_store;

use std::sync::Arc;

use calsync_core::EventSink;
use calsync_domain::constants::{EVENTS_COLUMNS, EVENTS_TABLE};
use calsync_domain::{DatabaseConfig, Result, SyncError};
use tracing::info;

pub use postgres_store::PostgresEventStore;
pub use sqlite_store::{SqliteEventStore, SqliteLocation};

/// Build the event sink described by `[database]`.
///
/// Only parses configuration; the connection is opened per write.
pub fn open_event_sink(config: &DatabaseConfig) -> Result<Arc<dyn EventSink>> {
    let connection_string = config.connection_string.trim();
    if connection_string.is_empty() {
        return Err(SyncError::Config("database connection string is not configured".into()));
    }

    if connection_string.starts_with("sqlite:") {
        let location = SqliteLocation::parse(connection_string).ok_or_else(|| {
            SyncError::Config("sqlite connection string is missing a path".into())
        })?;
        info!(backend = "sqlite", location = ?location, "event store configured");
        return Ok(Arc::new(
            SqliteEventStore::new(location)
                .transactional(config.transactional)
                .ensure_schema(config.ensure_schema)
                .busy_timeout(config.connect_timeout()),
        ));
    }

    let store = PostgresEventStore::new(config)?;
    info!(backend = "postgres", "event store configured");
    Ok(Arc::new(store))
}

/// `INSERT` for one [`calsync_domain::EventRow`], columns in
/// [`EVENTS_COLUMNS`] order. `placeholder` renders the 1-based bind marker.
pub(crate) fn insert_statement(placeholder: impl Fn(usize) -> String) -> String {
    let markers: Vec<String> = (1..=EVENTS_COLUMNS.len()).map(placeholder).collect();
    format!(
        "INSERT INTO {EVENTS_TABLE} ({}) VALUES ({})",
        EVENTS_COLUMNS.join(", "),
        markers.join(", ")
    )
}
