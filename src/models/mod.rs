// src/models/mod.rs

//! Domain models for the tracker.

mod config;
mod lot;
mod status;

// Re-export all public types
pub use config::Config;
pub use lot::{AVAILABLE_STATUS, LotList, LotRecord, MODEL_TYPE};
pub use status::{ChangeReport, ServiceStatus};

#[cfg(test)]
pub(crate) use config::tests::MINIMAL as MINIMAL_CONFIG;
