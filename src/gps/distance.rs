// src/gps/distance.rs
//! Great-circle distance and last-fix lookup

use super::data::Coordinate;
use super::status::FixStatus;
use crate::error::Result;
use log::warn;
use serde::Serialize;

/// Mean Earth radius (IUGG) in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// One persisted record, as far as the distance lookup cares
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalRecord {
    pub timestamp: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub satellites: Option<u32>,
}

/// Access to previously persisted records, grouped by day.
pub trait FixHistory {
    /// Day keys, most recent day first
    fn days(&self) -> Result<Vec<String>>;

    /// Records of one day in the order they were written
    fn records(&self, day: &str) -> Result<Vec<HistoricalRecord>>;
}

/// The most recent stored fix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastFix {
    pub timestamp: String,
    pub coordinate: Coordinate,
    pub satellites: Option<u32>,
}

/// Scan history newest-first and return the first record with status `fix`
/// and both coordinates present.
pub fn find_last_fix<H: FixHistory + ?Sized>(history: &H) -> Option<LastFix> {
    let days = match history.days() {
        Ok(days) => days,
        Err(e) => {
            warn!("Could not list fix history: {}", e);
            return None;
        }
    };

    for day in days {
        let records = match history.records(&day) {
            Ok(records) => records,
            Err(e) => {
                warn!("Could not read fix history for {}: {}", day, e);
                continue;
            }
        };

        let found = records.into_iter().rev().find_map(|record| {
            let is_fix = FixStatus::from_label(&record.status).is_some_and(|s| s.is_fix());
            match (is_fix, record.latitude, record.longitude) {
                (true, Some(lat), Some(lon)) => Some(LastFix {
                    timestamp: record.timestamp,
                    coordinate: Coordinate::new(lat, lon),
                    satellites: record.satellites,
                }),
                _ => None,
            }
        });

        if found.is_some() {
            return found;
        }
    }

    None
}

/// Distance from the last stored fix to a reference point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceReport {
    pub reference_point: Coordinate,
    pub last_fix_coordinate: Coordinate,
    pub last_fix_timestamp: String,
    pub satellites: Option<u32>,
    pub distance_km: f64,
}

/// Build a distance report, or `None` when no prior fix exists.
pub fn distance_report<H: FixHistory + ?Sized>(reference: Coordinate, history: &H) -> Option<DistanceReport> {
    let last = find_last_fix(history)?;
    Some(DistanceReport {
        reference_point: reference,
        last_fix_coordinate: last.coordinate,
        distance_km: haversine_km(last.coordinate, reference),
        last_fix_timestamp: last.timestamp,
        satellites: last.satellites,
    })
}
