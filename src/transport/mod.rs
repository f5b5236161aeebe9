// src/transport/mod.rs
//! Byte sources for NMEA data: hardware UART or bit-banged GPIO

pub mod framer;
pub mod pigpio;
pub mod serial;

use crate::error::GpsError;
use std::time::Duration;

pub use framer::LineFramer;
pub use pigpio::BitBangReader;
pub use serial::SerialReader;

/// Lines collected during one acquisition window.
///
/// `error` is set when the transport failed to open or broke partway; the
/// lines framed before the failure are kept.
#[derive(Debug, Default)]
pub struct WindowRead {
    pub lines: Vec<String>,
    pub error: Option<GpsError>,
}

impl WindowRead {
    pub fn failed(error: GpsError) -> Self {
        Self {
            lines: Vec::new(),
            error: Some(error),
        }
    }
}

/// The transport chosen for an acquisition
#[derive(Debug, Clone)]
pub enum Transport {
    Serial(SerialReader),
    BitBang(BitBangReader),
}

impl Transport {
    /// Collect candidate lines for at most `window`
    pub async fn read_lines(&self, window: Duration) -> WindowRead {
        match self {
            Transport::Serial(reader) => reader.read_lines(window).await,
            Transport::BitBang(reader) => reader.read_lines(window).await,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Transport::Serial(_) => "hardware UART",
            Transport::BitBang(_) => "bit-banged GPIO",
        }
    }
}
