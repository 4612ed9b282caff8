//! Conversions from external infrastructure errors into domain errors.

use calsync_domain::SyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tokio_postgres::Error as PgError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SyncError);

impl From<InfraError> for SyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SyncError> for InfraError {
    fn from(value: SyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSyncError {
    fn into_sync_error(self) -> SyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SyncError */
/* -------------------------------------------------------------------------- */

impl IntoSyncError for SqlError {
    fn into_sync_error(self) -> SyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => SyncError::Persist("database is busy".into()),
                    ErrorCode::DatabaseLocked => SyncError::Persist("database is locked".into()),
                    ErrorCode::CannotOpen => {
                        SyncError::Persist(format!("unable to open database: {message}"))
                    }
                    ErrorCode::ConstraintViolation => {
                        SyncError::Persist(format!("constraint violation: {message}"))
                    }
                    _ => SyncError::Persist(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::InvalidPath(path) => {
                SyncError::Persist(format!("invalid database path: {}", path.to_string_lossy()))
            }
            RE::InvalidQuery => SyncError::Persist("invalid SQL query".into()),
            other => SyncError::Persist(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_sync_error())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio_postgres::Error → SyncError */
/* -------------------------------------------------------------------------- */

impl IntoSyncError for PgError {
    fn into_sync_error(self) -> SyncError {
        if let Some(db) = self.as_db_error() {
            return SyncError::Persist(format!(
                "postgres error {}: {}",
                db.code().code(),
                db.message()
            ));
        }

        if self.is_closed() {
            return SyncError::Persist("postgres connection closed".into());
        }

        SyncError::Persist(format!("postgres failure: {self}"))
    }
}

impl From<PgError> for InfraError {
    fn from(value: PgError) -> Self {
        InfraError(value.into_sync_error())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

/// HTTP transport failure.
///
/// Not tied to a pipeline stage; the token and Graph adapters attribute it to
/// `Auth` or `Calendar` respectively.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<HttpError> for TransportError {
    fn from(err: HttpError) -> Self {
        if err.is_timeout() {
            return TransportError("HTTP request timed out".into());
        }

        if err.is_connect() {
            return TransportError(format!("HTTP connection failure: {err}"));
        }

        if let Some(status) = err.status() {
            return TransportError(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        if err.is_decode() {
            return TransportError(format!("invalid response body: {err}"));
        }

        TransportError(err.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
