// src/config.rs
//! Configuration: defaults, JSON file, then environment overrides

use crate::{
    error::{GpsError, Result},
    gps::Coordinate,
    transport::{BitBangReader, SerialReader, Transport},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr, time::Duration};

/// Which transport feeds the acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Dedicated UART such as `/dev/serial0`
    Serial,
    /// Software serial on a GPIO pin via pigpiod
    Bitbang,
}

impl FromStr for TransportKind {
    type Err = GpsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" | "uart" | "hard" => Ok(TransportKind::Serial),
            "bitbang" | "gpio" | "soft" => Ok(TransportKind::Bitbang),
            other => Err(GpsError::Config(format!("unknown transport '{}'", other))),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Serial => write!(f, "serial"),
            TransportKind::Bitbang => write!(f, "bitbang"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub transport: TransportKind,
    pub serial_port: String,
    pub serial_baudrate: u32,
    pub bitbang_pin: u32,
    pub bitbang_baudrate: u32,
    pub pigpio_host: String,
    pub pigpio_port: u16,
    /// Acquisition window in seconds
    pub read_window_secs: u64,
    pub reference_lat: f64,
    pub reference_lon: f64,
    pub data_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Serial,
            serial_port: "/dev/serial0".to_string(),
            serial_baudrate: 9600,
            bitbang_pin: 17,
            bitbang_baudrate: 9600,
            pigpio_host: "localhost".to_string(),
            pigpio_port: 8888,
            read_window_secs: 12,
            reference_lat: 31.283,
            reference_lon: 34.234,
            data_dir: default_data_dir(),
        }
    }
}

impl SnapshotConfig {
    /// Defaults, overlaid with the config file and then the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from the config file, or defaults when it does not exist
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| GpsError::Config(format!("Failed to read {}: {}", config_path.display(), e)))?;

        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| GpsError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Save to the config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| GpsError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config").join("gps-snapshot").join("config.json"))
    }

    /// Apply `GPS_*` overrides looked up through `var`.
    pub fn apply_env_with<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("GPS_TRANSPORT") {
            self.transport = v.parse()?;
        }
        if let Some(v) = var("GPS_SERIAL_PORT") {
            self.serial_port = v;
        }
        if let Some(v) = var("GPS_BAUD") {
            self.serial_baudrate = parse_env("GPS_BAUD", &v)?;
        }
        if let Some(v) = var("GPS_BITBANG_PIN") {
            self.bitbang_pin = parse_env("GPS_BITBANG_PIN", &v)?;
        }
        if let Some(v) = var("GPS_BITBANG_BAUD") {
            self.bitbang_baudrate = parse_env("GPS_BITBANG_BAUD", &v)?;
        }
        if let Some(v) = var("GPS_PIGPIO_HOST") {
            self.pigpio_host = v;
        }
        if let Some(v) = var("GPS_PIGPIO_PORT") {
            self.pigpio_port = parse_env("GPS_PIGPIO_PORT", &v)?;
        }
        if let Some(v) = var("GPS_READ_WINDOW_S") {
            self.read_window_secs = parse_env("GPS_READ_WINDOW_S", &v)?;
        }
        if let Some(v) = var("GPS_DATA_DIR") {
            self.data_dir = expand_home(&v);
        }
        if let Some(v) = var("GPS_REF_LAT") {
            self.reference_lat = parse_env("GPS_REF_LAT", &v)?;
        }
        if let Some(v) = var("GPS_REF_LON") {
            self.reference_lon = parse_env("GPS_REF_LON", &v)?;
        }
        Ok(())
    }

    pub fn read_window(&self) -> Duration {
        Duration::from_secs(self.read_window_secs)
    }

    pub fn reference_point(&self) -> Coordinate {
        Coordinate::new(self.reference_lat, self.reference_lon)
    }

    /// Build the transport selected by this configuration
    pub fn transport(&self) -> Transport {
        match self.transport {
            TransportKind::Serial => {
                Transport::Serial(SerialReader::new(self.serial_port.clone(), self.serial_baudrate))
            }
            TransportKind::Bitbang => Transport::BitBang(BitBangReader::new(
                self.pigpio_host.clone(),
                self.pigpio_port,
                self.bitbang_pin,
                self.bitbang_baudrate,
            )),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GpsError::Config(format!("{} has invalid value '{}'", key, value)))
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

fn default_data_dir() -> PathBuf {
    expand_home("~/gps-snapshot/data")
}
