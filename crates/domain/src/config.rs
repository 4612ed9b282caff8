//! Configuration structures
//!
//! Deserialized from `appsettings.{toml,json}` (plus an optional
//! `appsecrets` overlay and environment overrides) by the infra config
//! loader. Every section has defaults so partial files are accepted; the
//! values that have no sensible default are validated when the pipeline is
//! assembled.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTHORITY_HOST, DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_GRAPH_BASE_URL,
    DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_PAGES,
    DEFAULT_MONTHS_AFTER, DEFAULT_MONTHS_BEFORE, DEFAULT_PAGE_SIZE,
};
use crate::errors::Result;
use crate::impl_domain_option_conversions;
use crate::types::Credential;

/// Root configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub calendar: CalendarConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub debug: DebugConfig,
}

/// Identity and endpoint settings for Microsoft Graph.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub client_id: String,
    pub tenant_id: String,
    /// User principal name used for the password grant.
    pub user_id: String,
    pub password: String,
    pub authority_host: String,
    pub base_url: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            tenant_id: String::new(),
            user_id: String::new(),
            password: String::new(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
        }
    }
}

impl GraphConfig {
    /// Build the sign-in credential, failing on any blank identity field.
    pub fn credential(&self) -> Result<Credential> {
        Credential::new(&self.client_id, &self.tenant_id, &self.user_id, &self.password)
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("user_id", &self.user_id)
            .field("password", &"[redacted]")
            .field("authority_host", &self.authority_host)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// How the calendar client treats server-side paging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Follow `@odata.nextLink` until the result set is exhausted.
    #[default]
    Follow,
    /// Return only the first page (legacy behaviour).
    FirstPage,
}

impl_domain_option_conversions!(PaginationMode {
    Follow => "follow",
    FirstPage => "first_page",
});

/// Shared calendar selection and window settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Mailbox address of the shared calendar.
    pub shared_calendar_email: String,
    pub months_before: u32,
    pub months_after: u32,
    pub page_size: u32,
    pub pagination: PaginationMode,
    pub max_pages: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            shared_calendar_email: String::new(),
            months_before: DEFAULT_MONTHS_BEFORE,
            months_after: DEFAULT_MONTHS_AFTER,
            page_size: DEFAULT_PAGE_SIZE,
            pagination: PaginationMode::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Relational sink settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres://…`, a libpq key/value string, or `sqlite:<path>`.
    pub connection_string: String,
    /// Wrap the whole insert set in one transaction.
    pub transactional: bool,
    /// Create the destination table when it does not exist.
    pub ensure_schema: bool,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            transactional: false,
            ensure_schema: false,
            connect_timeout_secs: DEFAULT_DB_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Connection strings routinely embed passwords.
        let connection_string = if self.connection_string.is_empty() { "" } else { "[redacted]" };
        f.debug_struct("DatabaseConfig")
            .field("connection_string", &connection_string)
            .field("transactional", &self.transactional)
            .field("ensure_schema", &self.ensure_schema)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Outbound HTTP settings shared by the token and Graph requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Total attempts per request (1 disables retries).
    pub max_attempts: usize,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Mode flags. See [`crate::types::RunMode::from_flags`] for precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub login: bool,
    pub list_calendars: bool,
    pub display_calendar: bool,
}
