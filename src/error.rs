// src/error.rs
//! Error types for the GPS snapshot logger

use std::fmt;

pub type Result<T> = std::result::Result<T, GpsError>;

#[derive(Debug)]
pub enum GpsError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    Config(String),
    /// The serial device or bit-banged channel could not be opened
    TransportOpen(String),
    /// A read failed partway through the acquisition window
    TransportRead(String),
    /// The pigpio daemon is not reachable
    GpioUnavailable(String),
    /// pigpiod answered a command with a negative status code
    Pigpio { command: &'static str, code: i32 },
    Other(String),
}

impl GpsError {
    /// Compact reason carried in a `transport_error:<reason>` status label.
    pub fn status_reason(&self) -> String {
        let reason = match self {
            GpsError::TransportOpen(msg) => format!("open:{}", msg),
            GpsError::TransportRead(msg) => format!("read:{}", msg),
            GpsError::GpioUnavailable(msg) => format!("gpio_unavailable:{}", msg),
            GpsError::Pigpio { command, code } => format!("pigpio_{}:{}", command, code),
            GpsError::Io(e) => format!("io:{}", e),
            other => other.to_string(),
        };
        // Status labels end up in single CSV cells and log lines
        reason.replace(['\r', '\n'], " ")
    }
}

impl fmt::Display for GpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsError::Io(e) => write!(f, "IO error: {}", e),
            GpsError::Json(e) => write!(f, "JSON error: {}", e),
            GpsError::Csv(e) => write!(f, "CSV error: {}", e),
            GpsError::Config(msg) => write!(f, "Configuration error: {}", msg),
            GpsError::TransportOpen(msg) => write!(f, "Transport open failed: {}", msg),
            GpsError::TransportRead(msg) => write!(f, "Transport read failed: {}", msg),
            GpsError::GpioUnavailable(msg) => write!(f, "GPIO serial unavailable: {}", msg),
            GpsError::Pigpio { command, code } => {
                write!(f, "pigpio command {} failed with code {}", command, code)
            }
            GpsError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for GpsError {}

impl From<std::io::Error> for GpsError {
    fn from(error: std::io::Error) -> Self {
        GpsError::Io(error)
    }
}

impl From<serde_json::Error> for GpsError {
    fn from(error: serde_json::Error) -> Self {
        GpsError::Json(error)
    }
}

impl From<csv::Error> for GpsError {
    fn from(error: csv::Error) -> Self {
        GpsError::Csv(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason_tags() {
        let open = GpsError::TransportOpen("/dev/serial0: No such file".to_string());
        assert_eq!(open.status_reason(), "open:/dev/serial0: No such file");

        let pigpio = GpsError::Pigpio { command: "slro", code: -50 };
        assert_eq!(pigpio.status_reason(), "pigpio_slro:-50");
    }

    #[test]
    fn test_status_reason_is_single_line() {
        let err = GpsError::TransportRead("broken\r\npipe".to_string());
        assert_eq!(err.status_reason(), "read:broken  pipe");
    }

    #[test]
    fn test_io_reason_is_tagged() {
        let err = GpsError::from(std::io::Error::new(std::io::ErrorKind::TimedOut, "no reply"));
        assert_eq!(err.status_reason(), "io:no reply");
    }
}
