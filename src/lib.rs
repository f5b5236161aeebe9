// src/lib.rs
//! GPS Snapshot Library
//!
//! Acquires one GPS fix per invocation from a hardware UART or a bit-banged
//! GPIO line, decodes RMC/GGA sentences into a timestamped record, and reports
//! distance from the last stored fix to a reference point.

pub mod config;
pub mod display;
pub mod error;
pub mod gps;
pub mod monitor;
pub mod storage;
pub mod transport;

// Re-export main types for convenience
pub use config::{SnapshotConfig, TransportKind};
pub use error::{GpsError, Result};
pub use gps::{Coordinate, FixRecord, FixStatus};
pub use monitor::GpsMonitor;
pub use storage::RecordStore;
