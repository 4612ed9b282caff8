//! # calsync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The password-grant credential provider and bearer decoration
//! - The Microsoft Graph calendar client
//! - SQLite and PostgreSQL event stores
//! - The HTTP client and configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `calsync-core`
//! - Contains all "impure" code (network, storage, files)

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod graph;
pub mod http;

// Re-export commonly used items
pub use auth::{BearerAuthenticator, PasswordGrantProvider};
pub use database::{open_event_sink, PostgresEventStore, SqliteEventStore, SqliteLocation};
pub use errors::{InfraError, TransportError};
pub use graph::{GraphCalendarClient, GraphClientOptions};
pub use http::{HttpClient, HttpClientBuilder};
