//! Canonical `YYYY-MM-DD` keys identifying one local calendar day.
//!
//! The key is computed from the calendar date in the time zone of the
//! timestamp, never from its UTC date, so two instants on the same local day
//! always share a key.

use crate::errors::DayKeyError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Key for the local calendar day `at` falls on.
pub fn day_key<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    date_key(at.date_naive())
}

/// Key for the calendar day `instant` falls on when observed in `tz`.
pub fn day_key_in<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String {
    day_key(&instant.with_timezone(tz))
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a day key into its calendar date.
///
/// Exactly three dash-separated runs of ASCII digits are required and they
/// must name a real date. Zero padding is not enforced.
pub fn parse_day_key(key: &str) -> Result<NaiveDate, DayKeyError> {
    let malformed = || DayKeyError::Malformed(key.to_string());

    let parts: Vec<&str> = key.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(malformed());
    };
    if !parts
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(malformed());
    }

    let year: i32 = year.parse().map_err(|_| malformed())?;
    let month: u32 = month.parse().map_err(|_| malformed())?;
    let day: u32 = day.parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}

/// Normalises an accepted key to the zero-padded form records are stored under.
pub fn canonical_day_key(key: &str) -> Result<String, DayKeyError> {
    parse_day_key(key).map(date_key)
}

/// Parses a day key into the first instant of that day in `tz`.
///
/// When local midnight does not exist (a DST gap at 00:00) the first valid
/// hour of the day is used instead.
pub fn parse_day_key_in<Tz: TimeZone>(key: &str, tz: &Tz) -> Result<DateTime<Tz>, DayKeyError> {
    let date = parse_day_key(key)?;
    start_of_day(date, tz).ok_or_else(|| DayKeyError::Malformed(key.to_string()))
}

pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    (0..24)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
}

/// Row label such as `2026/02/15 (Sun)`.
///
/// Falls back to `created_at` when the stored key does not parse.
pub fn display_date<Tz: TimeZone>(key: &str, created_at: &DateTime<Utc>, tz: &Tz) -> String {
    let date = match parse_day_key(key) {
        Ok(date) => date,
        Err(err) => {
            tracing::warn!("{err}, falling back to createdAt");
            created_at.with_timezone(tz).date_naive()
        }
    };
    date.format("%Y/%m/%d (%a)").to_string()
}
