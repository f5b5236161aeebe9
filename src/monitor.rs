// src/monitor.rs
//! One acquisition: transport window, decode, timestamp, classification

use crate::{
    config::SnapshotConfig,
    gps::{
        data::FixRecord,
        nmea,
        status::{classify, FixStatus},
        time::{resolve_timestamp, system_time},
    },
    transport::{Transport, WindowRead},
};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::time::Duration;

/// Runs acquisition windows against one transport
pub struct GpsMonitor {
    transport: Transport,
    window: Duration,
}

impl GpsMonitor {
    pub fn new(transport: Transport, window: Duration) -> Self {
        Self { transport, window }
    }

    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self::new(config.transport(), config.read_window())
    }

    /// Acquire one record. Never fails: transport problems are reported in
    /// the record's status.
    pub async fn snapshot(&self) -> FixRecord {
        info!("Acquiring fix over {} for {:?}", self.transport.describe(), self.window);
        let read = self.transport.read_lines(self.window).await;
        finalize(read, Utc::now())
    }
}

/// Turn a window's worth of transport output into a record.
///
/// `now` is the host clock reading used for the fallback timestamp.
pub fn finalize(read: WindowRead, now: DateTime<Utc>) -> FixRecord {
    if let Some(error) = read.error {
        if !read.lines.is_empty() {
            warn!("Discarding {} line(s) read before the transport failed", read.lines.len());
        }
        let host = system_time(now);
        let status = classify(Some(&error.status_reason()), false, false, host.source);
        return FixRecord::empty(host.timestamp, &status);
    }

    let observation = nmea::decode(&read.lines);
    let resolved = resolve_timestamp(&observation.raw_date, &observation.raw_time, observation.has_fix(), now);
    let status = classify(None, observation.nmea_seen, observation.has_fix(), resolved.source);

    let record = FixRecord::from_observation(&observation, resolved.timestamp, &status);
    match status {
        FixStatus::Fix => info!(
            "Fix at {}: lat={:?} lon={:?} sats={:?} hdop={:?}",
            record.timestamp_utc, record.lat, record.lon, record.sats, record.hdop
        ),
        ref other => info!("No position ({}), {} line(s) read", other, read.lines.len()),
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GpsError;
    use crate::transport::SerialReader;
    use chrono::TimeZone;

    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn lines(raw: &[&str]) -> WindowRead {
        WindowRead {
            lines: raw.iter().map(|s| s.to_string()).collect(),
            error: None,
        }
    }

    #[test]
    fn test_full_fix_record() {
        let record = finalize(lines(&[GGA, RMC]), now());

        assert_eq!(record.status, "fix");
        assert_eq!(record.timestamp_utc, "1994-03-23T12:35:19Z");
        assert!((record.lat.unwrap() - 48.1173).abs() < 1e-6);
        assert!((record.lon.unwrap() - 11.516667).abs() < 1e-6);
        assert_eq!(record.sats, Some(8));
        assert_eq!(record.hdop, Some(0.9));
        assert_eq!(record.alt_m, Some(545.4));
        assert_eq!(record.speed_kmh, Some(41.485));
        assert_eq!(record.course_deg, Some(84.4));
        assert_eq!(record.fix_quality, 1);
        assert_eq!(record.raw_date_utc, "230394");
        assert_eq!(record.raw_time_utc, "123519");
    }

    #[test]
    fn test_no_nmea_with_host_clock() {
        let record = finalize(lines(&[]), now());
        assert_eq!(record.status, "system_time_no_nmea");
        assert_eq!(record.timestamp_utc, "2025-06-01T08:00:00Z");
        assert!(record.coordinate().is_none());
    }

    #[test]
    fn test_nmea_without_fix_with_host_clock() {
        let record = finalize(
            lines(&["$GPRMC,235947,V,,,,,,,130998,,*62", "$GPGGA,235947,,,,,0,00,,,M,,M,,"]),
            now(),
        );
        assert_eq!(record.status, "system_time_no_fix");
        assert_eq!(record.timestamp_utc, "2025-06-01T08:00:00Z");
        assert_eq!(record.raw_date_utc, "130998");
        assert_eq!(record.sats, Some(0));
        assert!(record.coordinate().is_none());
    }

    #[test]
    fn test_no_time_with_unset_clock() {
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 1, 0).unwrap();
        let record = finalize(lines(&["$GPGGA,,,,,,0,,,,,,,,"]), epoch);
        assert_eq!(record.status, "no_time");
        assert_eq!(record.timestamp_utc, "");
    }

    #[test]
    fn test_transport_error_record() {
        let read = WindowRead {
            lines: vec![RMC.to_string()],
            error: Some(GpsError::TransportRead("device unplugged".to_string())),
        };
        let record = finalize(read, now());

        assert_eq!(record.status, "transport_error:read:device unplugged");
        assert_eq!(record.timestamp_utc, "2025-06-01T08:00:00Z");
        assert!(record.lat.is_none());
        assert!(record.lon.is_none());
        assert!(record.alt_m.is_none());
        assert!(record.sats.is_none());
    }

    #[tokio::test]
    async fn test_uart_open_failure_yields_record() {
        let monitor = GpsMonitor::new(
            Transport::Serial(SerialReader::new("/dev/does-not-exist-gps", 9600)),
            Duration::from_millis(100),
        );
        let record = monitor.snapshot().await;

        assert!(record.status.starts_with("transport_error:open:"));
        assert!(record.coordinate().is_none());
        assert!(record.hdop.is_none());
        assert!(record.speed_kmh.is_none());
    }
}
