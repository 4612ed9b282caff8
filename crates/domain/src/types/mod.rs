//! Domain types and models

pub mod credential;
pub mod directory;
pub mod event;
pub mod mode;
pub mod window;

pub use credential::{AccessToken, Credential};
pub use directory::{CalendarSummary, Principal};
pub use event::{CalendarEvent, EventRow};
pub use mode::RunMode;
pub use window::TimeWindow;
