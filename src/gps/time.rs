// src/gps/time.rs
//! Timestamp resolution: GPS time, host clock, or nothing

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

/// Host clocks reading this year or earlier are treated as unset
pub const MIN_PLAUSIBLE_YEAR: i32 = 2020;

/// Where the timestamp of a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    Gps,
    System,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTime {
    pub timestamp: Option<DateTime<Utc>>,
    pub source: TimeSource,
}

/// Compose a UTC timestamp from RMC `hhmmss[.sss]` and `ddmmyy` tokens.
///
/// Two-digit years below 80 are 20yy, the rest 19yy.
pub fn parse_rmc_time_date(time: &str, date: &str) -> Option<DateTime<Utc>> {
    let hh = two_digits(time, 0)?;
    let mm = two_digits(time, 2)?;
    let ss = two_digits(time, 4)?;
    if let Some(rest) = time.get(6..) {
        if !rest.is_empty() && !rest.starts_with('.') {
            return None;
        }
    }

    if date.len() != 6 {
        return None;
    }
    let day = two_digits(date, 0)?;
    let month = two_digits(date, 2)?;
    let yy = two_digits(date, 4)? as i32;
    let year = if yy < 80 { 2000 + yy } else { 1900 + yy };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hh, mm, ss)?;
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

/// True when the host clock looks like it has been set.
pub fn host_clock_plausible(now: DateTime<Utc>) -> bool {
    now.year() > MIN_PLAUSIBLE_YEAR
}

/// Pick the authoritative timestamp for a window.
///
/// GPS time is only trusted alongside a valid fix; otherwise the host clock
/// is used when plausible.
pub fn resolve_timestamp(date: &str, time: &str, fix_valid: bool, now: DateTime<Utc>) -> ResolvedTime {
    if fix_valid {
        if let Some(ts) = parse_rmc_time_date(time, date) {
            return ResolvedTime {
                timestamp: Some(ts),
                source: TimeSource::Gps,
            };
        }
        log::debug!("Unusable GPS date/time '{}' '{}', falling back to host clock", date, time);
    }

    system_time(now)
}

/// Timestamp from the host clock alone.
pub fn system_time(now: DateTime<Utc>) -> ResolvedTime {
    if host_clock_plausible(now) {
        ResolvedTime {
            timestamp: Some(now),
            source: TimeSource::System,
        }
    } else {
        ResolvedTime {
            timestamp: None,
            source: TimeSource::None,
        }
    }
}

fn two_digits(s: &str, at: usize) -> Option<u32> {
    let part = s.get(at..at + 2)?;
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_rmc_time_date() {
        assert_eq!(
            parse_rmc_time_date("123519", "230394"),
            Some(utc(1994, 3, 23, 12, 35, 19))
        );
        assert_eq!(
            parse_rmc_time_date("000000", "010110"),
            Some(utc(2010, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_fractional_seconds_ignored() {
        assert_eq!(
            parse_rmc_time_date("123519.00", "230394"),
            Some(utc(1994, 3, 23, 12, 35, 19))
        );
    }

    #[test]
    fn test_century_boundary() {
        assert_eq!(parse_rmc_time_date("000000", "010179").map(|t| t.year()), Some(2079));
        assert_eq!(parse_rmc_time_date("000000", "010180").map(|t| t.year()), Some(1980));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(parse_rmc_time_date("", "230394"), None);
        assert_eq!(parse_rmc_time_date("123519", ""), None);
        assert_eq!(parse_rmc_time_date("1235", "230394"), None);
        assert_eq!(parse_rmc_time_date("12a519", "230394"), None);
        assert_eq!(parse_rmc_time_date("123519", "320394"), None);
        assert_eq!(parse_rmc_time_date("123519", "231394"), None);
        assert_eq!(parse_rmc_time_date("256019", "230394"), None);
        assert_eq!(parse_rmc_time_date("123519", "2303941"), None);
    }

    #[test]
    fn test_resolve_prefers_gps_with_valid_fix() {
        let now = utc(2025, 6, 1, 8, 0, 0);
        let resolved = resolve_timestamp("230394", "123519", true, now);
        assert_eq!(resolved.source, TimeSource::Gps);
        assert_eq!(resolved.timestamp, Some(utc(1994, 3, 23, 12, 35, 19)));
    }

    #[test]
    fn test_resolve_without_fix_uses_host_clock() {
        let now = utc(2025, 6, 1, 8, 0, 0);
        let resolved = resolve_timestamp("230394", "123519", false, now);
        assert_eq!(resolved.source, TimeSource::System);
        assert_eq!(resolved.timestamp, Some(now));
    }

    #[test]
    fn test_resolve_bad_tokens_fall_back() {
        let now = utc(2025, 6, 1, 8, 0, 0);
        let resolved = resolve_timestamp("999999", "123519", true, now);
        assert_eq!(resolved.source, TimeSource::System);
    }

    #[test]
    fn test_unset_host_clock_yields_no_time() {
        let now = utc(1970, 1, 1, 0, 0, 42);
        let resolved = resolve_timestamp("", "", false, now);
        assert_eq!(resolved.source, TimeSource::None);
        assert_eq!(resolved.timestamp, None);

        assert!(!host_clock_plausible(utc(2020, 12, 31, 23, 59, 59)));
        assert!(host_clock_plausible(utc(2021, 1, 1, 0, 0, 0)));
    }
}
