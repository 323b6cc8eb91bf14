#![forbid(unsafe_code)]

//! Rack inventory model and the per-device parsing steps of the rack layout engine (headless).
//!
//! Design goals:
//! - never fail on malformed device records: every per-device problem becomes a [`Diagnostic`]
//! - deterministic, testable outputs (same records in, same classification out)
//! - no I/O beyond the explicit inventory/config loaders

pub mod config;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod height;
pub mod position;

pub use config::RackConfig;
pub use device::{DeviceKind, DeviceRecord, Inventory};
pub use diagnostics::{Diagnostic, RejectReason};
pub use error::{Error, Result};
pub use height::{Classification, HeightClass, HeightClassifier, HeightRule};
pub use position::{PositionError, UnitIndex, parse_position};

/// Number of addressable units in a standard rack. Unit 1 is the bottom, unit 42 the top.
pub const RACK_UNITS: u8 = 42;

#[cfg(test)]
mod tests;
