// src/gps/mod.rs
//! GPS data handling and parsing

pub mod data;
pub mod distance;
pub mod nmea;
pub mod status;
pub mod time;

pub use data::{Coordinate, FixObservation, FixRecord};
pub use status::FixStatus;
