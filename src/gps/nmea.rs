// src/gps/nmea.rs
//! NMEA sentence decoding (RMC and GGA)

use super::data::FixObservation;
use log::debug;

const KNOTS_TO_KMH: f64 = 1.852;

/// Minimum field count (tag included) for RMC and GGA sentences
const MIN_FIELDS: usize = 10;

/// Split a sentence into its comma-separated fields.
///
/// A trailing `*hh` checksum is cut from the last field; it is not verified.
pub fn sentence_fields(line: &str) -> Vec<&str> {
    let body = line.trim();
    let body = match body.rfind('*') {
        Some(star) => &body[..star],
        None => body,
    };
    body.split(',').collect()
}

/// Recommended Minimum sentence
#[derive(Debug, Clone, PartialEq)]
pub struct RmcSentence {
    pub time: String,
    pub valid: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_knots: Option<f64>,
    pub course: Option<f64>,
    pub date: String,
}

impl RmcSentence {
    pub fn parse(fields: &[&str]) -> Option<Self> {
        if fields.len() < MIN_FIELDS {
            return None;
        }

        Some(Self {
            time: fields[1].to_string(),
            valid: fields[2] == "A",
            latitude: dm_to_deg(fields[3], fields[4]),
            longitude: dm_to_deg(fields[5], fields[6]),
            speed_knots: parse_opt(fields[7]),
            course: parse_opt(fields[8]),
            date: fields[9].to_string(),
        })
    }

    pub fn speed_kmh(&self) -> Option<f64> {
        self.speed_knots.map(|knots| knots * KNOTS_TO_KMH)
    }
}

/// Global Positioning System Fix Data sentence
#[derive(Debug, Clone, PartialEq)]
pub struct GgaSentence {
    pub fix_quality: u8,
    pub satellites: Option<u32>,
    pub hdop: Option<f64>,
    pub altitude: Option<f64>,
}

impl GgaSentence {
    pub fn parse(fields: &[&str]) -> Option<Self> {
        if fields.len() < MIN_FIELDS {
            return None;
        }

        Some(Self {
            fix_quality: parse_opt(fields[6]).unwrap_or(0),
            satellites: parse_opt(fields[7]),
            hdop: parse_opt(fields[8]),
            altitude: parse_opt(fields[9]),
        })
    }
}

/// Sentence types this decoder understands
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    Rmc(RmcSentence),
    Gga(GgaSentence),
}

/// Classify and parse one `$`-prefixed line.
///
/// Returns `None` for other sentence types and for malformed RMC/GGA lines.
pub fn parse_sentence(line: &str) -> Option<Sentence> {
    if line.starts_with("$GPRMC") || line.starts_with("$GNRMC") {
        RmcSentence::parse(&sentence_fields(line)).map(Sentence::Rmc)
    } else if line.starts_with("$GPGGA") || line.starts_with("$GNGGA") {
        GgaSentence::parse(&sentence_fields(line)).map(Sentence::Gga)
    } else {
        None
    }
}

/// Feed one line into the observation. Returns true once a valid RMC
/// position is held and decoding can stop.
pub fn apply_line(observation: &mut FixObservation, line: &str) -> bool {
    if !line.starts_with('$') {
        return observation.has_fix();
    }
    observation.nmea_seen = true;

    match parse_sentence(line) {
        Some(Sentence::Rmc(rmc)) => {
            observation.raw_time = rmc.time.clone();
            observation.raw_date = rmc.date.clone();
            if rmc.valid && observation.set_position(rmc.latitude, rmc.longitude) {
                observation.speed = rmc.speed_kmh();
                observation.course = rmc.course;
            }
        }
        Some(Sentence::Gga(gga)) => {
            observation.fix_quality = gga.fix_quality;
            observation.satellites = gga.satellites;
            observation.hdop = gga.hdop;
            observation.altitude = gga.altitude;
        }
        None => debug!("Skipping sentence: {}", line),
    }

    observation.has_fix()
}

/// Decode a window of candidate lines into one observation.
///
/// Lines after the first valid RMC position are not consumed.
pub fn decode<I, S>(lines: I) -> FixObservation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut observation = FixObservation::new();

    for (index, line) in lines.into_iter().enumerate() {
        if apply_line(&mut observation, line.as_ref()) {
            debug!("Valid fix after {} line(s), stopping early", index + 1);
            break;
        }
    }

    observation
}

/// Convert an NMEA `ddmm.mmmm` / `dddmm.mmmm` token to signed decimal degrees.
///
/// The hemisphere letter decides the width of the degree part: two digits for
/// N/S, three for E/W.
pub fn dm_to_deg(token: &str, hemisphere: &str) -> Option<f64> {
    if token.is_empty() {
        return None;
    }

    let (degree_digits, negative) = match hemisphere {
        "N" => (2, false),
        "S" => (2, true),
        "E" => (3, false),
        "W" => (3, true),
        _ => return None,
    };

    let degrees_str = token.get(..degree_digits)?;
    let minutes_str = token.get(degree_digits..)?;
    if !degrees_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let degrees: f64 = degrees_str.parse().ok()?;
    let minutes: f64 = if minutes_str.is_empty() {
        0.0
    } else {
        minutes_str.parse().ok()?
    };

    let value = degrees + minutes / 60.0;
    Some(if negative { -value } else { value })
}

fn parse_opt<T: std::str::FromStr>(field: &str) -> Option<T> {
    if field.is_empty() {
        None
    } else {
        field.trim().parse().ok()
    }
}
