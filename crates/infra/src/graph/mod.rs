//! Microsoft Graph calendar client

pub mod client;
mod types;

pub use client::{GraphCalendarClient, GraphClientOptions};
