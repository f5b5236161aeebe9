// src/gps/data.rs
//! GPS data structures and utilities

use super::status::FixStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column order of a persisted fix record
pub const RECORD_FIELDS: [&str; 12] = [
    "timestamp_utc",
    "lat",
    "lon",
    "alt_m",
    "sats",
    "hdop",
    "speed_kmh",
    "course_deg",
    "fix_quality",
    "raw_date_utc",
    "raw_time_utc",
    "status",
];

/// A position in signed decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Whether the current window has produced a valid RMC position yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixProgress {
    #[default]
    NoFix,
    Fix,
}

/// Accumulator filled while one acquisition window is decoded
#[derive(Debug, Clone, Default)]
pub struct FixObservation {
    position: Option<Coordinate>,
    pub altitude: Option<f64>,   // meters
    pub satellites: Option<u32>,
    pub hdop: Option<f64>,
    pub speed: Option<f64>,      // km/h
    pub course: Option<f64>,     // degrees
    pub fix_quality: u8,
    pub raw_date: String,
    pub raw_time: String,
    pub nmea_seen: bool,
    pub progress: FixProgress,
}

impl FixObservation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a position from a valid RMC sentence.
    ///
    /// Latitude and longitude only ever move together, so a sentence that
    /// yields one half of the pair leaves the observation untouched.
    pub fn set_position(&mut self, latitude: Option<f64>, longitude: Option<f64>) -> bool {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => {
                self.position = Some(Coordinate::new(lat, lon));
                self.progress = FixProgress::Fix;
                true
            }
            _ => false,
        }
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    pub fn latitude(&self) -> Option<f64> {
        self.position.map(|p| p.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.position.map(|p| p.longitude)
    }

    pub fn has_fix(&self) -> bool {
        self.progress == FixProgress::Fix
    }
}

/// Finished, immutable result of one acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixRecord {
    pub timestamp_utc: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub alt_m: Option<f64>,
    pub sats: Option<u32>,
    pub hdop: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub course_deg: Option<f64>,
    pub fix_quality: u8,
    pub raw_date_utc: String,
    pub raw_time_utc: String,
    pub status: String,
}

impl FixRecord {
    /// Finalize a decoded observation
    pub fn from_observation(
        observation: &FixObservation,
        timestamp: Option<DateTime<Utc>>,
        status: &FixStatus,
    ) -> Self {
        Self {
            timestamp_utc: format_timestamp(timestamp),
            lat: observation.latitude().map(|v| round_to(v, 6)),
            lon: observation.longitude().map(|v| round_to(v, 6)),
            alt_m: observation.altitude.map(|v| round_to(v, 6)),
            sats: observation.satellites,
            hdop: observation.hdop.map(|v| round_to(v, 2)),
            speed_kmh: observation.speed.map(|v| round_to(v, 3)),
            course_deg: observation.course.map(|v| round_to(v, 1)),
            fix_quality: observation.fix_quality,
            raw_date_utc: observation.raw_date.clone(),
            raw_time_utc: observation.raw_time.clone(),
            status: status.label(),
        }
    }

    /// Record emitted when no data could be decoded at all
    pub fn empty(timestamp: Option<DateTime<Utc>>, status: &FixStatus) -> Self {
        Self::from_observation(&FixObservation::new(), timestamp, status)
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }

    pub fn is_fix(&self) -> bool {
        self.status == FixStatus::Fix.label()
    }
}

/// ISO-8601 with second precision, or empty when time is unknown
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|ts| ts.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_default()
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
