use chrono::{TimeZone, Timelike, Utc};

use super::{parse_timestamp, start_of_day, storage_precision, utc_now};

#[test]
fn test_parse_rfc3339_utc() {
    let dt = parse_timestamp("2024-03-01T10:15:30Z").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap());
}

#[test]
fn test_parse_rfc3339_with_offset_converts_to_utc() {
    let dt = parse_timestamp("2024-03-01T10:00:00+03:00").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap());
}

#[test]
fn test_parse_space_restored_as_plus() {
    // "+03:00" arrives as " 03:00" after query-string decoding
    let dt = parse_timestamp("2024-03-01T10:00:00 03:00").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap());
}

#[test]
fn test_parse_compact_offset() {
    let dt = parse_timestamp("2024-03-01T10:00:00+0130").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap());
}

#[test]
fn test_parse_naive_is_utc() {
    let dt = parse_timestamp("2023-01-01T00:00:00").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_parse_naive_with_fraction() {
    let dt = parse_timestamp("2023-01-01T12:30:45.250").unwrap();
    assert_eq!(dt.nanosecond(), 250_000_000);
    assert_eq!(dt.second(), 45);
}

#[test]
fn test_parse_without_seconds() {
    let dt = parse_timestamp("2023-06-15T08:30").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2023, 6, 15, 8, 30, 0).unwrap());
}

#[test]
fn test_parse_date_only() {
    let dt = parse_timestamp("2023-06-15").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap());
}

#[test]
fn test_parse_rejects_garbage() {
    let err = parse_timestamp("not-a-date").unwrap_err();
    assert!(err.contains("ISO 8601"));
    assert!(parse_timestamp("").is_err());
    assert!(parse_timestamp("2023-13-01T00:00:00").is_err());
}

#[test]
fn test_start_of_day() {
    let dt = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    assert_eq!(
        start_of_day(dt),
        Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
    );
    let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    assert_eq!(start_of_day(midnight), midnight);
}

#[test]
fn test_utc_now_has_microsecond_precision() {
    let now = utc_now();
    assert_eq!(now.nanosecond() % 1_000, 0);
}

#[test]
fn test_storage_precision_drops_sub_microseconds() {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    let precise = base + chrono::Duration::nanoseconds(5_000_999);
    assert_eq!(storage_precision(precise), base + chrono::Duration::microseconds(5_000));
    assert_eq!(storage_precision(base), base);
}
