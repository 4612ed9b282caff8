//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Identity platform
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

// Graph API
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Fields requested from the calendar view, in `$select` order.
pub const CALENDAR_VIEW_FIELDS: [&str; 6] =
    ["subject", "start", "end", "organizer", "location", "bodyPreview"];

// Time window
pub const DEFAULT_MONTHS_BEFORE: u32 = 1;
pub const DEFAULT_MONTHS_AFTER: u32 = 1;

// Transport / storage timeouts
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 1;
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;

// Destination table
pub const EVENTS_TABLE: &str = "CalendarEvents";
pub const EVENTS_COLUMNS: [&str; 6] =
    ["Subject", "StartTime", "EndTime", "Organizer", "Location", "BodyPreview"];
