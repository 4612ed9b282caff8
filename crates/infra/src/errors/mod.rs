//! Error mapping at the adapter boundary

pub mod conversions;

pub use conversions::{InfraError, TransportError};
