// src/display/mod.rs
//! Short text lines for small status screens and the terminal

pub mod terminal;

use crate::gps::{
    data::FixRecord,
    distance::{DistanceReport, LastFix},
    Coordinate,
};

/// Most lines a status screen can show at once
pub const MAX_LINES: usize = 5;

/// Receiver fix-quality code as text
pub fn fix_quality_description(quality: u8) -> String {
    match quality {
        0 => "No fix".to_string(),
        1 => "GPS".to_string(),
        2 => "DGPS".to_string(),
        3 => "PPS".to_string(),
        4 => "RTK".to_string(),
        5 => "Float RTK".to_string(),
        6 => "Estimated".to_string(),
        7 => "Manual".to_string(),
        8 => "Simulation".to_string(),
        _ => format!("Unknown ({})", quality),
    }
}

/// Summary of a freshly acquired record
pub fn record_lines(record: &FixRecord) -> Vec<String> {
    let when = if record.timestamp_utc.is_empty() {
        "unknown UTC".to_string()
    } else {
        record.timestamp_utc.clone()
    };

    match record.coordinate() {
        Some(c) if record.is_fix() => vec![
            "FIX".to_string(),
            format!("{:.5},{:.5}", c.latitude, c.longitude),
            format!(
                "Sats: {}  HDOP: {}",
                record.sats.map_or("?".to_string(), |s| s.to_string()),
                record.hdop.map_or("?".to_string(), |h| format!("{:.1}", h))
            ),
            fix_quality_description(record.fix_quality),
            when,
        ],
        _ => vec![
            record.status.to_ascii_uppercase(),
            "No valid position yet".to_string(),
            when,
        ],
    }
}

/// Distance from the last stored fix to the reference point
pub fn distance_lines(report: Option<&DistanceReport>) -> Vec<String> {
    match report {
        Some(r) => vec![
            "Last FIX -> reference".to_string(),
            format!("{:.1} km", r.distance_km),
            format!("({:.4},{:.4})", r.last_fix_coordinate.latitude, r.last_fix_coordinate.longitude),
            if r.last_fix_timestamp.is_empty() {
                "unknown UTC".to_string()
            } else {
                r.last_fix_timestamp.clone()
            },
        ],
        None => vec!["No last fix".to_string(), "found in data/".to_string()],
    }
}

/// Compact one-glance status
pub fn brief_lines(last: Option<&LastFix>, reference: Coordinate) -> Vec<String> {
    match last {
        Some(fix) => {
            let km = crate::gps::distance::haversine_km(fix.coordinate, reference);
            vec![
                format!("{:.3},{:.3}", fix.coordinate.latitude, fix.coordinate.longitude),
                format!("{:.1} km -> reference", km),
                format!("Sats: {}", fix.satellites.map_or("?".to_string(), |s| s.to_string())),
            ]
        }
        None => vec!["No fix yet".to_string(), "Check GPS...".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::FixStatus;

    #[test]
    fn test_fix_record_lines() {
        let mut record = FixRecord::empty(None, &FixStatus::Fix);
        record.lat = Some(48.1173);
        record.lon = Some(11.516667);
        record.sats = Some(8);
        record.hdop = Some(0.9);
        record.fix_quality = 1;

        let lines = record_lines(&record);
        assert_eq!(lines[0], "FIX");
        assert_eq!(lines[1], "48.11730,11.51667");
        assert_eq!(lines[2], "Sats: 8  HDOP: 0.9");
        assert_eq!(lines[3], "GPS");
        assert_eq!(lines[4], "unknown UTC");
        assert!(lines.len() <= MAX_LINES);
    }

    #[test]
    fn test_no_fix_record_lines() {
        let record = FixRecord::empty(None, &FixStatus::SystemTimeNoNmea);
        let lines = record_lines(&record);
        assert_eq!(lines[0], "SYSTEM_TIME_NO_NMEA");
    }

    #[test]
    fn test_distance_lines() {
        let report = DistanceReport {
            reference_point: Coordinate::new(0.0, 0.0),
            last_fix_coordinate: Coordinate::new(0.0, 1.0),
            last_fix_timestamp: "2025-06-01T08:00:00Z".to_string(),
            satellites: Some(5),
            distance_km: 111.195,
        };
        let lines = distance_lines(Some(&report));
        assert_eq!(lines[1], "111.2 km");
        assert_eq!(lines[2], "(0.0000,1.0000)");

        assert_eq!(distance_lines(None)[0], "No last fix");
    }

    #[test]
    fn test_brief_lines() {
        let fix = LastFix {
            timestamp: String::new(),
            coordinate: Coordinate::new(31.283, 34.234),
            satellites: None,
        };
        let lines = brief_lines(Some(&fix), Coordinate::new(31.283, 34.234));
        assert_eq!(lines, vec!["31.283,34.234", "0.0 km -> reference", "Sats: ?"]);
        assert_eq!(fix_quality_description(9), "Unknown (9)");
    }
}
