//! Calendar-view queries against Microsoft Graph
//!
//! Every request asks Graph to render times in UTC and projects events down to
//! the six fields the job stores. Paging follows `@odata.nextLink` unless the
//! client is configured for the legacy first-page-only behaviour.

use async_trait::async_trait;
use calsync_core::CalendarSource;
use calsync_domain::constants::CALENDAR_VIEW_FIELDS;
use calsync_domain::{
    AccessToken, CalendarConfig, CalendarEvent, CalendarSummary, GraphConfig, PaginationMode,
    Principal, Result, SyncError, TimeWindow,
};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::types::{GraphCalendar, GraphEvent, GraphUser, ODataErrorBody, ODataPage};
use crate::auth::BearerAuthenticator;
use crate::http::client::error_body;
use crate::http::HttpClient;

const OUTLOOK_TIMEZONE_HEADER: &str = r#"outlook.timezone="UTC""#;

/// Tunables for [`GraphCalendarClient`].
#[derive(Debug, Clone)]
pub struct GraphClientOptions {
    pub base_url: Url,
    pub page_size: u32,
    pub pagination: PaginationMode,
    pub max_pages: u32,
}

impl GraphClientOptions {
    pub fn from_config(graph: &GraphConfig, calendar: &CalendarConfig) -> Result<Self> {
        let base_url = Url::parse(graph.base_url.trim()).map_err(|e| {
            SyncError::Config(format!("invalid Graph base URL '{}': {e}", graph.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "Graph base URL '{}' cannot be used as a base URL",
                graph.base_url
            )));
        }
        if calendar.page_size == 0 {
            return Err(SyncError::Config("calendar page_size must be at least 1".into()));
        }

        Ok(Self {
            base_url,
            page_size: calendar.page_size,
            pagination: calendar.pagination,
            max_pages: calendar.max_pages.max(1),
        })
    }
}

/// Graph-backed [`CalendarSource`].
#[derive(Clone)]
pub struct GraphCalendarClient {
    http: HttpClient,
    options: GraphClientOptions,
}

impl GraphCalendarClient {
    pub fn new(http: HttpClient, options: GraphClientOptions) -> Self {
        Self { http, options }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.options.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Config("Graph base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn calendar_view_url(&self, mailbox: &str, window: &TimeWindow) -> Result<Url> {
        let mut url = self.endpoint(&["users", mailbox, "calendarView"])?;
        url.query_pairs_mut()
            .append_pair("startDateTime", &window.start_param())
            .append_pair("endDateTime", &window.end_param())
            .append_pair("$select", &CALENDAR_VIEW_FIELDS.join(","))
            .append_pair("$top", &self.options.page_size.to_string());
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, auth: &BearerAuthenticator, url: Url) -> Result<T> {
        let request = auth.authorize(
            self.http
                .request(Method::GET, url)
                .header(ACCEPT, HeaderValue::from_static("application/json"))
                .header("Prefer", OUTLOOK_TIMEZONE_HEADER),
        );

        let response = self.http.send(request).await.map_err(|e| {
            error!(error = %e, "error accessing user calendar");
            SyncError::Calendar(e.to_string())
        })?;

        let response = check_status(response).await?;

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "error accessing user calendar");
            SyncError::Calendar(format!("failed to parse Graph response: {e}"))
        })
    }

    /// Collect the items of a paged collection starting at `url`.
    async fn collect<T: DeserializeOwned>(
        &self,
        auth: &BearerAuthenticator,
        url: Url,
        pagination: PaginationMode,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url);
        let mut pages = 0u32;

        while let Some(url) = next.take() {
            if pages >= self.options.max_pages {
                error!(max_pages = self.options.max_pages, "error accessing user calendar");
                return Err(SyncError::Calendar(format!(
                    "result set exceeds {} pages",
                    self.options.max_pages
                )));
            }

            let page: ODataPage<T> = self.fetch(auth, url).await?;
            pages += 1;
            debug!(page = pages, items = page.value.len(), "received Graph page");
            items.extend(page.value);

            match (page.next_link, pagination) {
                (Some(link), PaginationMode::Follow) => {
                    next = Some(Url::parse(&link).map_err(|e| {
                        SyncError::Calendar(format!("invalid @odata.nextLink: {e}"))
                    })?);
                }
                (Some(_), PaginationMode::FirstPage) => {
                    warn!(
                        returned = items.len(),
                        "more results available; only the first page is kept"
                    );
                }
                (None, _) => {}
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl CalendarSource for GraphCalendarClient {
    #[instrument(skip(self, token, window), fields(start = %window.start_param(), end = %window.end_param()))]
    async fn get_calendar_events(
        &self,
        token: &AccessToken,
        mailbox: &str,
        window: &TimeWindow,
    ) -> Result<Vec<CalendarEvent>> {
        let auth = BearerAuthenticator::new(token.clone());
        let url = self.calendar_view_url(mailbox, window)?;

        let events = self
            .collect::<GraphEvent>(&auth, url, self.options.pagination)
            .await?
            .into_iter()
            .map(GraphEvent::into_domain)
            .collect::<Result<Vec<_>>>()?;

        info!(count = events.len(), "calendar view retrieved");
        Ok(events)
    }

    #[instrument(skip(self, token))]
    async fn list_calendars(&self, token: &AccessToken) -> Result<Vec<CalendarSummary>> {
        let auth = BearerAuthenticator::new(token.clone());
        let mut url = self.endpoint(&["me", "calendars"])?;
        url.query_pairs_mut().append_pair("$select", "name,id");

        let calendars = self.collect::<GraphCalendar>(&auth, url, PaginationMode::Follow).await?;
        Ok(calendars.into_iter().map(CalendarSummary::from).collect())
    }

    #[instrument(skip(self, token))]
    async fn current_principal(&self, token: &AccessToken) -> Result<Principal> {
        let auth = BearerAuthenticator::new(token.clone());
        let mut url = self.endpoint(&["me"])?;
        url.query_pairs_mut().append_pair("$select", "displayName,userPrincipalName");

        let user: GraphUser = self.fetch(&auth, url).await?;
        Ok(user.into())
    }
}

/// Pass 2xx responses through; turn anything else into a calendar error,
/// preferring Graph's own error text.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = error_body(response).await;
    match serde_json::from_str::<ODataErrorBody>(&body) {
        Ok(odata) => {
            let message = odata.error.describe();
            error!(status = status.as_u16(), %message, "Graph API error");
            Err(SyncError::Calendar(message))
        }
        Err(_) => {
            error!(status = status.as_u16(), "error accessing user calendar");
            Err(SyncError::Calendar(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            )))
        }
    }
}
