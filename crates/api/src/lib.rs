//! # calsync App
//!
//! Command-line layer of the calendar sync job.
//!
//! This crate contains:
//! - CLI argument parsing
//! - Application context (dependency injection)
//! - Console rendering of run outcomes
//! - Logging initialisation and the `calsync` entry point
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the infra adapters into the core pipeline

pub mod cli;
pub mod context;
pub mod logging;
pub mod output;

// Re-export for convenience
pub use cli::Cli;
pub use context::AppContext;
