//! PostgreSQL-backed implementation of the EventSink port.
//!
//! Each call opens its own connection, writes, and drops it. TLS is used when
//! the connection string asks for `sslmode=require`.

use std::time::Duration;

use async_trait::async_trait;
use calsync_core::EventSink;
use calsync_domain::{CalendarEvent, DatabaseConfig, EventRow, Result, SyncError};
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::config::SslMode;
use tokio_postgres::{Client, Config, GenericClient, NoTls};
use tracing::{debug, info, instrument, warn};

use super::insert_statement;
use crate::errors::InfraError;

const SCHEMA_SQL: &str = include_str!("postgres_schema.sql");

/// Writes events to PostgreSQL.
pub struct PostgresEventStore {
    config: Config,
    transactional: bool,
    ensure_schema: bool,
    connect_timeout: Duration,
}

impl PostgresEventStore {
    /// Parse the connection string (URL or key/value form). No connection is
    /// made until events are persisted.
    pub fn new(database: &DatabaseConfig) -> Result<Self> {
        let mut config: Config = database.connection_string.trim().parse().map_err(|e| {
            // The parser error never echoes the password.
            SyncError::Config(format!("invalid PostgreSQL connection string: {e}"))
        })?;
        let connect_timeout = database.connect_timeout();
        config.connect_timeout(connect_timeout);

        Ok(Self {
            config,
            transactional: database.transactional,
            ensure_schema: database.ensure_schema,
            connect_timeout,
        })
    }

    fn requires_tls(&self) -> bool {
        matches!(self.config.get_ssl_mode(), SslMode::Require)
    }

    async fn connect(&self) -> Result<Client> {
        let connecting = async {
            if self.requires_tls() {
                let connector = native_tls::TlsConnector::new().map_err(|e| {
                    SyncError::Persist(format!("failed to initialise TLS: {e}"))
                })?;
                let (client, connection) = self
                    .config
                    .connect(MakeTlsConnector::new(connector))
                    .await
                    .map_err(InfraError::from)?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!(error = %e, "postgres connection ended with error");
                    }
                });
                Ok::<_, SyncError>(client)
            } else {
                let (client, connection) =
                    self.config.connect(NoTls).await.map_err(InfraError::from)?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!(error = %e, "postgres connection ended with error");
                    }
                });
                Ok(client)
            }
        };

        tokio::time::timeout(self.connect_timeout, connecting).await.map_err(|_| {
            SyncError::Persist(format!(
                "timed out connecting to PostgreSQL after {}s",
                self.connect_timeout.as_secs()
            ))
        })?
    }
}

#[async_trait]
impl EventSink for PostgresEventStore {
    #[instrument(skip(self, events), fields(count = events.len(), transactional = self.transactional))]
    async fn persist_events(&self, events: &[CalendarEvent]) -> Result<usize> {
        let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();

        let mut client = self.connect().await?;
        debug!(tls = self.requires_tls(), "postgres connection opened");

        if self.ensure_schema {
            client.batch_execute(SCHEMA_SQL).await.map_err(InfraError::from)?;
        }

        let written = if self.transactional {
            let tx = client.transaction().await.map_err(InfraError::from)?;
            let written = insert_rows(&tx, &rows).await?;
            tx.commit().await.map_err(InfraError::from)?;
            written
        } else {
            insert_rows(&client, &rows).await?
        };

        info!(written, "events persisted to postgres");
        Ok(written)
    }
}

async fn insert_rows<C>(client: &C, rows: &[EventRow]) -> Result<usize>
where
    C: GenericClient + Sync,
{
    let sql = insert_statement(|i| format!("${i}"));
    let stmt = client.prepare(&sql).await.map_err(InfraError::from)?;

    for (index, row) in rows.iter().enumerate() {
        client
            .execute(
                &stmt,
                &[
                    &row.subject,
                    &row.start_time,
                    &row.end_time,
                    &row.organizer,
                    &row.location,
                    &row.body_preview,
                ],
            )
            .await
            .map_err(|e| {
                let err: SyncError = InfraError::from(e).into();
                SyncError::Persist(format!(
                    "insert of event {} failed: {}",
                    index + 1,
                    err.message()
                ))
            })?;
    }

    Ok(rows.len())
}
