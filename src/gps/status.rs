// src/gps/status.rs
//! Fix status classification

use super::time::TimeSource;
use std::fmt;

const TRANSPORT_ERROR_PREFIX: &str = "transport_error:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixStatus {
    Fix,
    /// Written by earlier loggers that had no host-clock fallback
    NoFix,
    /// Written by earlier loggers that had no host-clock fallback
    NoNmea,
    SystemTimeNoFix,
    SystemTimeNoNmea,
    NoTime,
    TransportError(String),
}

impl FixStatus {
    /// Label as persisted in the `status` column
    pub fn label(&self) -> String {
        match self {
            FixStatus::Fix => "fix".to_string(),
            FixStatus::NoFix => "no_fix".to_string(),
            FixStatus::NoNmea => "no_nmea".to_string(),
            FixStatus::SystemTimeNoFix => "system_time_no_fix".to_string(),
            FixStatus::SystemTimeNoNmea => "system_time_no_nmea".to_string(),
            FixStatus::NoTime => "no_time".to_string(),
            FixStatus::TransportError(reason) => format!("{}{}", TRANSPORT_ERROR_PREFIX, reason),
        }
    }

    /// Parse a persisted label, case-insensitively. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with(TRANSPORT_ERROR_PREFIX) {
            let reason = &trimmed[TRANSPORT_ERROR_PREFIX.len()..];
            return Some(FixStatus::TransportError(reason.to_string()));
        }

        match lower.as_str() {
            "fix" => Some(FixStatus::Fix),
            "no_fix" => Some(FixStatus::NoFix),
            "no_nmea" => Some(FixStatus::NoNmea),
            "system_time_no_fix" => Some(FixStatus::SystemTimeNoFix),
            "system_time_no_nmea" => Some(FixStatus::SystemTimeNoNmea),
            "no_time" => Some(FixStatus::NoTime),
            _ => None,
        }
    }

    pub fn is_fix(&self) -> bool {
        matches!(self, FixStatus::Fix)
    }
}

impl fmt::Display for FixStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Decide the status of one acquisition window.
///
/// Precedence: transport error, then GPS-timed fix, then host-clock states,
/// then no time at all.
pub fn classify(
    transport_error: Option<&str>,
    nmea_seen: bool,
    fix_valid: bool,
    time_source: TimeSource,
) -> FixStatus {
    if let Some(reason) = transport_error {
        return FixStatus::TransportError(reason.to_string());
    }

    match time_source {
        TimeSource::None => FixStatus::NoTime,
        // System here means a valid position whose date/time tokens were unusable
        _ if fix_valid => FixStatus::Fix,
        _ if nmea_seen => FixStatus::SystemTimeNoFix,
        _ => FixStatus::SystemTimeNoNmea,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_wins() {
        let status = classify(Some("open:no device"), true, true, TimeSource::Gps);
        assert_eq!(status, FixStatus::TransportError("open:no device".to_string()));
        assert_eq!(status.label(), "transport_error:open:no device");
    }

    #[test]
    fn test_gps_fix() {
        assert_eq!(classify(None, true, true, TimeSource::Gps), FixStatus::Fix);
    }

    #[test]
    fn test_system_time_states() {
        assert_eq!(
            classify(None, true, false, TimeSource::System),
            FixStatus::SystemTimeNoFix
        );
        assert_eq!(
            classify(None, false, false, TimeSource::System),
            FixStatus::SystemTimeNoNmea
        );
    }

    #[test]
    fn test_position_with_host_clock_is_fix() {
        assert_eq!(classify(None, true, true, TimeSource::System), FixStatus::Fix);
    }

    #[test]
    fn test_no_time() {
        assert_eq!(classify(None, true, false, TimeSource::None), FixStatus::NoTime);
        assert_eq!(classify(None, false, false, TimeSource::None), FixStatus::NoTime);
    }

    #[test]
    fn test_label_round_trip_for_legacy_values() {
        assert_eq!(FixStatus::from_label("FIX"), Some(FixStatus::Fix));
        assert_eq!(FixStatus::from_label("no_nmea"), Some(FixStatus::NoNmea));
        assert_eq!(
            FixStatus::from_label("transport_error:read:timeout"),
            Some(FixStatus::TransportError("read:timeout".to_string()))
        );
        assert_eq!(FixStatus::from_label("error_open_serial:x"), None);
    }
}
