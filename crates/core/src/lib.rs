//! # calsync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the credential exchange, the
//!   calendar provider and the event store
//! - The sync pipeline use case that sequences them for one run
//!
//! ## Architecture Principles
//! - Only depends on `calsync-domain`
//! - No database or HTTP code
//! - All external dependencies via traits

pub mod sync;

pub use sync::ports::{CalendarSource, CredentialProvider, EventSink};
pub use sync::service::{SyncOutcome, SyncPipeline, SyncRequest};
