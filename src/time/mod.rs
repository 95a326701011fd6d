//! Wall-clock formatting and timezone conversion.
//!
//! Pure functions over an explicit instant so callers (and tests) control
//! the clock. Tool handlers wrap these with `Utc::now()`.

use chrono::{DateTime, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;

pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

#[derive(thiserror::Error, Debug)]
pub enum TimeError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),
}

/// Format the given instant in an IANA timezone.
pub fn format_in(instant: DateTime<Utc>, timezone: &str) -> Result<String, TimeError> {
    let zone = parse_timezone(timezone)?;
    Ok(instant
        .with_timezone(&zone)
        .format(DISPLAY_FORMAT)
        .to_string())
}

/// Format the current instant in an IANA timezone (UTC when omitted).
pub fn current_time(timezone: Option<&str>) -> Result<String, TimeError> {
    format_in(Utc::now(), timezone.unwrap_or("UTC"))
}

/// Convert a datetime string between timezones.
///
/// `datetime` accepts RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS` /
/// `YYYY-MM-DD HH:MM:SS`; naive values are interpreted in `source`.
/// A missing datetime means the given `now`.
pub fn convert(
    datetime: Option<&str>,
    source: &str,
    target: &str,
    now: DateTime<Utc>,
) -> Result<String, TimeError> {
    let instant = match datetime {
        Some(s) => parse_datetime(s, source)?,
        None => now,
    };
    format_in(instant, target)
}

fn parse_timezone(name: &str) -> Result<Tz, TimeError> {
    name.parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimezone(name.to_string()))
}

fn parse_datetime(s: &str, source_tz: &str) -> Result<DateTime<Utc>, TimeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| TimeError::InvalidDatetime(s.to_string()))?;

    let zone = parse_timezone(source_tz)?;
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TimeError::InvalidDatetime(format!("{s} does not exist in {source_tz}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn formats_shanghai_with_utc8_offset() {
        let s = format_in(fixed_instant(), "Asia/Shanghai").unwrap();
        assert_eq!(s, "2024-01-01 08:00:00 +08:00");
    }

    #[test]
    fn converts_utc_to_new_york_winter() {
        // EST in January, UTC-5
        let s = convert(
            Some("2024-01-01T00:00:00Z"),
            "UTC",
            "America/New_York",
            fixed_instant(),
        )
        .unwrap();
        assert_eq!(s, "2023-12-31 19:00:00 -05:00");
    }

    #[test]
    fn converts_utc_to_new_york_summer() {
        // EDT in July, UTC-4
        let s = convert(
            Some("2024-07-01T12:00:00Z"),
            "UTC",
            "America/New_York",
            fixed_instant(),
        )
        .unwrap();
        assert_eq!(s, "2024-07-01 08:00:00 -04:00");
    }

    #[test]
    fn naive_datetime_uses_source_timezone() {
        let s = convert(
            Some("2024-01-01T08:00:00"),
            "Asia/Shanghai",
            "UTC",
            fixed_instant(),
        )
        .unwrap();
        assert_eq!(s, "2024-01-01 00:00:00 +00:00");
    }

    #[test]
    fn missing_datetime_uses_now() {
        let s = convert(None, "UTC", "Asia/Shanghai", fixed_instant()).unwrap();
        assert_eq!(s, "2024-01-01 08:00:00 +08:00");
    }

    #[test]
    fn malformed_datetime_is_an_error() {
        let err = convert(Some("not-a-date"), "UTC", "UTC", fixed_instant()).unwrap_err();
        assert!(matches!(err, TimeError::InvalidDatetime(_)));
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        let err = format_in(fixed_instant(), "Mars/Olympus_Mons").unwrap_err();
        assert!(matches!(err, TimeError::UnknownTimezone(_)));
    }

    #[test]
    fn conversion_is_deterministic() {
        let a = convert(Some("2024-01-01T00:00:00Z"), "UTC", "Asia/Tokyo", fixed_instant());
        let b = convert(Some("2024-01-01T00:00:00Z"), "UTC", "Asia/Tokyo", fixed_instant());
        assert_eq!(a.unwrap(), b.unwrap());
    }
}
