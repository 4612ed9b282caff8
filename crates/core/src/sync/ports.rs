//! Port interfaces for sync operations

use async_trait::async_trait;
use calsync_domain::{
    AccessToken, CalendarEvent, CalendarSummary, Credential, Principal, Result, TimeWindow,
};

/// Exchanges a sign-in credential for a bearer token.
///
/// Implementations fail with `SyncError::Auth` on any failure and never
/// retry.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Acquire a token bound to `scopes`.
    async fn authenticate(&self, credential: &Credential, scopes: &[&str]) -> Result<AccessToken>;
}

/// Calendar provider queries, all authenticated with the caller's token.
///
/// Failures surface as `SyncError::Calendar`.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events of `mailbox` within `window`, in provider order.
    async fn get_calendar_events(
        &self,
        token: &AccessToken,
        mailbox: &str,
        window: &TimeWindow,
    ) -> Result<Vec<CalendarEvent>>;

    /// Calendars visible to the authenticated principal (not the mailbox).
    async fn list_calendars(&self, token: &AccessToken) -> Result<Vec<CalendarSummary>>;

    /// The authenticated principal itself.
    async fn current_principal(&self, token: &AccessToken) -> Result<Principal>;
}

/// Relational sink for fetched events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Insert one row per event and return the number of rows written.
    ///
    /// The store connection is acquired and released within the call, even
    /// for an empty slice. Failures surface as `SyncError::Persist`.
    async fn persist_events(&self, events: &[CalendarEvent]) -> Result<usize>;
}
