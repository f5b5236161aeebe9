// src/main.rs
//! GPS Snapshot - one-shot GPS fix logger

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use gps_snapshot::{
    display::{self, terminal::{TerminalDisplay, Tone}},
    gps::distance::{distance_report, find_last_fix},
    *,
};
use log::warn;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gps-snapshot", version, about = "Log one GPS fix per run")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Default)]
struct Overrides {
    /// Transport to read from: serial or bitbang
    #[arg(long, global = true)]
    transport: Option<TransportKind>,

    /// Serial device path
    #[arg(long, global = true)]
    device: Option<String>,

    /// Serial baud rate
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// GPIO pin for bit-banged reception
    #[arg(long, global = true)]
    pin: Option<u32>,

    /// Acquisition window in seconds
    #[arg(long, global = true)]
    window: Option<u64>,

    /// Directory holding the daily record files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Reference latitude for distance reports
    #[arg(long, global = true, allow_hyphen_values = true)]
    ref_lat: Option<f64>,

    /// Reference longitude for distance reports
    #[arg(long, global = true, allow_hyphen_values = true)]
    ref_lon: Option<f64>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Acquire one fix and append it to today's record file (default)
    Snapshot,
    /// Distance from the last stored fix to the reference point
    Distance,
    /// Compact summary of the last stored fix
    Brief,
    /// List available serial ports
    Ports,
    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

impl Overrides {
    fn apply(&self, config: &mut SnapshotConfig) {
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(device) = &self.device {
            config.serial_port = device.clone();
        }
        if let Some(baud) = self.baud {
            match config.transport {
                TransportKind::Serial => config.serial_baudrate = baud,
                TransportKind::Bitbang => config.bitbang_baudrate = baud,
            }
        }
        if let Some(pin) = self.pin {
            config.bitbang_pin = pin;
        }
        if let Some(window) = self.window {
            config.read_window_secs = window;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(lat) = self.ref_lat {
            config.reference_lat = lat;
        }
        if let Some(lon) = self.ref_lon {
            config.reference_lon = lon;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Snapshot);

    let mut config = match SnapshotConfig::load() {
        Ok(config) => config,
        // A scheduled snapshot still runs on defaults
        Err(e) if matches!(command, Command::Snapshot) => {
            warn!("{}; using defaults", e);
            SnapshotConfig::default()
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };
    cli.overrides.apply(&mut config);

    match command {
        Command::Snapshot => run_snapshot(&config, cli.overrides.json).await,
        Command::Distance => run_distance(&config, cli.overrides.json)?,
        Command::Brief => run_brief(&config)?,
        Command::Ports => list_serial_ports()?,
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                config.save().context("Failed to save configuration")?;
                println!("Saved to {}", SnapshotConfig::get_config_path()?.display());
            }
        }
    }

    Ok(())
}

/// Acquire and persist one record. Always succeeds so that periodic
/// schedulers never see a failed run just because no fix was available.
async fn run_snapshot(config: &SnapshotConfig, json: bool) {
    let monitor = GpsMonitor::from_config(config);
    let record = monitor.snapshot().await;

    let store = RecordStore::new(&config.data_dir);
    if let Err(e) = store.append(&record, Utc::now()) {
        warn!("Could not append record to {}: {}", store.dir().display(), e);
    }

    if json {
        match serde_json::to_string(&record) {
            Ok(text) => println!("{}", text),
            Err(e) => warn!("Could not encode record: {}", e),
        }
        return;
    }

    let lines = display::record_lines(&record);
    if let Err(e) = TerminalDisplay::new().show(&lines, Tone::for_status(&record.status)) {
        warn!("Could not write to terminal: {}", e);
    }
}

fn run_distance(config: &SnapshotConfig, json: bool) -> anyhow::Result<()> {
    let store = RecordStore::new(&config.data_dir);
    let report = distance_report(config.reference_point(), &store);

    if json {
        let value = match &report {
            Some(report) => serde_json::to_value(report)?,
            None => serde_json::json!({ "no_prior_fix": true }),
        };
        println!("{}", value);
        return Ok(());
    }

    let tone = if report.is_some() { Tone::Good } else { Tone::Warning };
    TerminalDisplay::new().show(&display::distance_lines(report.as_ref()), tone)?;
    Ok(())
}

fn run_brief(config: &SnapshotConfig) -> anyhow::Result<()> {
    let store = RecordStore::new(&config.data_dir);
    let last = find_last_fix(&store);
    let tone = if last.is_some() { Tone::Good } else { Tone::Warning };

    TerminalDisplay::new().show(&display::brief_lines(last.as_ref(), config.reference_point()), tone)?;
    Ok(())
}

/// List available serial ports
fn list_serial_ports() -> anyhow::Result<()> {
    let ports = tokio_serial::available_ports().context("Failed to list serial ports")?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {:?}", port.port_name, port.port_type);
        }
    }

    Ok(())
}
