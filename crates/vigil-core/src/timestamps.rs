//! Lenient timestamp parsing for request payloads.
//!
//! Field clients send follow-up dates as naive ISO strings
//! (`2026-03-01T09:00:00`, always meant as UTC) while other callers send full
//! RFC 3339. Both are accepted, together with date-only values.
//!
//! Accepts:
//! - RFC 3339 with timezone or offset: `2026-01-15T10:30:00Z`, `...+02:00`
//! - ISO 8601 without timezone (assumes UTC): `2026-01-15T10:30:00`, `2026-01-15T10:30:00.125`
//! - Space separated: `2026-01-15 10:30:00`
//! - Date only (assumes midnight UTC): `2026-01-15`

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp string in any of the accepted formats.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Timestamp cannot be empty. Expected ISO 8601 (e.g. '2026-01-15T10:30:00Z')".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(format!(
        "Invalid timestamp '{}'. Expected ISO 8601 (e.g. '2026-01-15T10:30:00Z', '2026-01-15T10:30:00' or '2026-01-15')",
        s
    ))
}

/// Deserialize a required timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(de::Error::custom)
}

/// Deserialize an optional timestamp; `null`, `""` and `"null"` become `None`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("null") => Ok(None),
        Some(s) => parse_timestamp(s).map(Some).map_err(de::Error::custom),
    }
}

/// Deserialize a patch field: absent stays `None` (via `#[serde(default)]`),
/// an explicit null or blank clears (`Some(None)`), a value sets.
pub fn deserialize_patch<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_option(deserializer).map(Some)
}
