//! Timestamps written by the todo service.
//!
//! The service sends RFC 3339 values when its database keeps an offset, and
//! naive ISO 8601 values (`2025-01-01T10:00:00`) when it does not. Naive
//! values are read as UTC. These functions plug into
//! `#[serde(deserialize_with = "...")]`; serialization stays RFC 3339.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an RFC 3339 or naive ISO 8601 timestamp
#[must_use]
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn parse_or_error<E: Error>(value: &str) -> Result<DateTime<Utc>, E> {
    parse(value).ok_or_else(|| E::custom(format!("invalid timestamp: {value}")))
}

/// Deserializes a required timestamp
///
/// # Errors
///
/// Fails when the value is not a string in either accepted format.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_or_error(&value)
}

/// Deserializes a nullable timestamp
///
/// # Errors
///
/// Fails when a non-null value is not in either accepted format.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|value| parse_or_error(&value))
        .transpose()
}

/// Deserializes a nullable timestamp whose presence matters
///
/// A present field becomes `Some`, even when it is `null`; pair it with
/// `#[serde(default)]` so an absent field stays `None`.
///
/// # Errors
///
/// Fails when a non-null value is not in either accepted format.
pub fn deserialize_present<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_option(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ten_am() -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).single()
    }

    #[test]
    fn rfc3339_values_keep_their_offset() {
        assert_eq!(parse("2025-01-01T10:00:00Z"), ten_am());
        assert_eq!(parse("2025-01-01T12:00:00+02:00"), ten_am());
    }

    #[test]
    fn naive_values_are_read_as_utc() {
        assert_eq!(parse("2025-01-01T10:00:00"), ten_am());
        assert_eq!(parse("2025-01-01 10:00:00"), ten_am());

        let fractional = parse("2025-01-01T10:00:00.250000");
        assert_eq!(fractional.map(|t| t.timestamp_subsec_millis()), Some(250));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse(""), None);
    }
}
