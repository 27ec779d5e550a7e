//! Timezone handling for milestone timestamps
//!
//! Partners receive event times as local wall-clock values, and the
//! disambiguation ledger is keyed by the local calendar day. This module
//! provides the timezone wrapper used for both conversions.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use std::str::FromStr;

/// Timezone wrapper for configured field timezones
///
/// Wraps chrono_tz::Tz with custom serialization support so configuration
/// documents can carry IANA names such as `America/New_York`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timezone::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parses an IANA timezone name
    pub fn parse(name: &str) -> Result<Self, TemporalError> {
        Tz::from_str(name.trim())
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(name.to_string()))
    }

    /// Returns the IANA name of the timezone
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Gets local midnight for the given calendar day
    ///
    /// When midnight falls into a DST gap the earliest valid instant of the
    /// day is used instead.
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Tz>, TemporalError> {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        if let Some(local) = midnight.and_local_timezone(self.0).earliest() {
            return Ok(local);
        }
        // Gap at midnight: walk forward to the first representable minute.
        (1..=120)
            .filter_map(|m| {
                (midnight + Duration::minutes(m))
                    .and_local_timezone(self.0)
                    .earliest()
            })
            .next()
            .ok_or(TemporalError::NonexistentLocalTime(midnight.to_string()))
    }

    /// Truncates a local datetime to midnight of the same calendar day
    pub fn truncate_to_day(&self, value: &DateTime<Tz>) -> Result<DateTime<Tz>, TemporalError> {
        self.start_of_day(value.date_naive())
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::America::New_York)
    }
}

impl std::fmt::Display for Timezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.name())
    }
}

/// Minutes elapsed since local midnight, ignoring seconds
pub fn minute_of_day(value: &DateTime<Tz>) -> u32 {
    value.hour() * 60 + value.minute()
}

/// Shifts a local datetime by whole minutes, returning `None` when the
/// result would fall on a different calendar day
pub fn shift_within_day(value: &DateTime<Tz>, minutes: i32) -> Option<DateTime<Tz>> {
    let shifted = *value + Duration::minutes(i64::from(minutes));
    (shifted.date_naive() == value.date_naive()).then_some(shifted)
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local time does not exist: {0}")]
    NonexistentLocalTime(String),
}
