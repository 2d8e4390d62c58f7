//! Timestamp helpers shared by the HTTP layer, repositories and statistics.
//!
//! Every timestamp inside the crate is a `DateTime<Utc>`. Inputs carrying an
//! offset are converted to UTC; naive inputs are taken to already be UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Utc};

/// Naive layouts accepted after RFC 3339 parsing fails.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Offset-carrying layouts that are valid ISO-8601 but not RFC 3339.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// Current instant truncated to microseconds, the precision Postgres keeps.
pub fn utc_now() -> DateTime<Utc> {
    storage_precision(Utc::now())
}

/// Truncate `instant` to microseconds.
///
/// Every stored timestamp passes through here so both backends hold the
/// same instants.
pub fn storage_precision(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(6)
}

/// Midnight (UTC) of the day containing `instant`.
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Parse an ISO-8601 timestamp coming from a query string.
///
/// A `+` in a query string decodes to a space, so the first space is put
/// back as `+` before parsing (`2024-03-01T10:00:00 03:00`).
///
/// Accepted shapes:
/// - RFC 3339 with `Z` or a numeric offset
/// - `YYYY-MM-DDTHH:MM[:SS[.f]]` with an optional `+hhmm` offset
/// - naive `YYYY-MM-DDTHH:MM[:SS[.f]]`, read as UTC
/// - bare `YYYY-MM-DD`, read as midnight UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let fixed = raw.trim().replacen(' ', "+", 1);

    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(&fixed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(&fixed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let naive = fixed.strip_suffix('Z').unwrap_or(&fixed);
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(format!(
        "Invalid timestamp '{}'. Use ISO 8601 (e.g., '2023-01-01T00:00:00')",
        raw
    ))
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod time_tests;
