// src/storage.rs
//! Daily CSV record files and the history lookup over them

use crate::error::{GpsError, Result};
use crate::gps::{
    data::FixRecord,
    distance::{FixHistory, HistoricalRecord},
};
use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const FILE_SUFFIX: &str = "_gps.csv";

/// Appends records to `<dir>/YYYY-MM-DD_gps.csv`, one file per UTC day
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn day_path(&self, day: &str) -> PathBuf {
        self.dir.join(format!("{}{}", day, FILE_SUFFIX))
    }

    /// Append `record` to the file for the UTC day of `now`, writing the
    /// header first when the file is new.
    pub fn append(&self, record: &FixRecord, now: DateTime<Utc>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.day_path(&now.format("%Y-%m-%d").to_string());
        let write_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        debug!("Appended {} record to {}", record.status, path.display());
        Ok(path)
    }
}

/// Columns read back from record files; older files may lack some.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredRow {
    timestamp_utc: String,
    lat: String,
    lon: String,
    sats: String,
    status: String,
}

impl From<StoredRow> for HistoricalRecord {
    fn from(row: StoredRow) -> Self {
        Self {
            timestamp: row.timestamp_utc,
            latitude: row.lat.trim().parse().ok(),
            longitude: row.lon.trim().parse().ok(),
            status: row.status,
            satellites: row.sats.trim().parse().ok(),
        }
    }
}

impl FixHistory for RecordStore {
    fn days(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut days = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            if let Some(day) = name.to_str().and_then(|n| n.strip_suffix(FILE_SUFFIX)) {
                days.push(day.to_string());
            }
        }
        // YYYY-MM-DD names sort chronologically
        days.sort_unstable_by(|a, b| b.cmp(a));
        Ok(days)
    }

    fn records(&self, day: &str) -> Result<Vec<HistoricalRecord>> {
        let path = self.day_path(day);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| GpsError::Other(format!("{}: {}", path.display(), e)))?;

        let mut records = Vec::new();
        for row in reader.deserialize::<StoredRow>() {
            match row {
                Ok(row) => records.push(row.into()),
                Err(e) => debug!("Skipping unreadable row in {}: {}", path.display(), e),
            }
        }
        Ok(records)
    }
}
