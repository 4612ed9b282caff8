//! Calendar sync: ports and the one-shot pipeline

pub mod ports;
pub mod service;
