//! Date, time and zone producers.
//!
//! Every value is drawn from the configured date range; nothing reads the
//! wall clock.

use crate::parameters::DateRange;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use fixture_core::GeneratedValue;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// First and last second of the date range as Unix timestamps.
pub fn timestamp_bounds(range: &DateRange) -> (i64, i64) {
    let start = range.start.and_time(NaiveTime::default()).and_utc().timestamp();
    let end = range.end.and_time(NaiveTime::default()).and_utc().timestamp() + SECONDS_PER_DAY - 1;
    (start, end)
}

fn random_timestamp<R: Rng>(rng: &mut R, start: i64, end: i64) -> i64 {
    if start >= end {
        start
    } else {
        rng.random_range(start..=end)
    }
}

fn random_date_time<R: Rng>(rng: &mut R, range: &DateRange) -> DateTime<Utc> {
    let (start, end) = timestamp_bounds(range);
    let seconds = random_timestamp(rng, start, end);
    DateTime::from_timestamp(seconds, 0)
        .unwrap_or_else(|| range.start.and_time(NaiveTime::default()).and_utc())
}

/// Generate a random date in the range.
pub fn generate_date<R: Rng>(rng: &mut R, range: &DateRange) -> GeneratedValue {
    GeneratedValue::Date(random_date_time(rng, range).date_naive())
}

/// Generate a random time of day with second precision.
pub fn generate_time<R: Rng>(rng: &mut R) -> GeneratedValue {
    let seconds = rng.random_range(0..SECONDS_PER_DAY as u32);
    GeneratedValue::Time(
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default(),
    )
}

/// Generate a random zone-less date and time in the range.
pub fn generate_local_date_time<R: Rng>(rng: &mut R, range: &DateRange) -> GeneratedValue {
    GeneratedValue::LocalDateTime(random_date_time(rng, range).naive_utc())
}

/// Generate a random UTC timestamp in the range.
pub fn generate_date_time<R: Rng>(rng: &mut R, range: &DateRange) -> GeneratedValue {
    GeneratedValue::DateTime(random_date_time(rng, range))
}

/// Generate a random duration in the given range of seconds (inclusive).
pub fn generate_duration<R: Rng>(rng: &mut R, min_secs: i64, max_secs: i64) -> GeneratedValue {
    GeneratedValue::Duration(TimeDelta::seconds(random_timestamp(rng, min_secs, max_secs)))
}

/// Generate a random IANA zone identifier.
pub fn generate_zone_id<R: Rng>(rng: &mut R) -> GeneratedValue {
    match chrono_tz::TZ_VARIANTS.choose(rng) {
        Some(tz) => GeneratedValue::String(tz.name().to_string()),
        None => GeneratedValue::String("UTC".to_string()),
    }
}

/// Generate a random timestamp in the given range.
///
/// The start and end should be ISO 8601 formatted timestamps or dates.
pub fn generate_timestamp_range<R: Rng>(
    rng: &mut R,
    start: &str,
    end: &str,
) -> Option<GeneratedValue> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    let seconds = random_timestamp(rng, start.timestamp(), end.timestamp());
    let dt = DateTime::from_timestamp(seconds, 0).unwrap_or(start);
    Some(GeneratedValue::DateTime(dt))
}

/// Parse a timestamp string in various formats.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Try common date-only format
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}
