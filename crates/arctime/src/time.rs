//! Conversions between absolute timestamps and arc-time seconds.
//!
//! Absolute time is `chrono::DateTime<Utc>`. All arc-time geometry works in
//! `f64` seconds relative to a base instant.

use chrono::{DateTime, Duration, Utc};

/// Seconds from `base` to `t` (negative when `t` precedes `base`).
#[inline]
pub fn secs_between(base: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    duration_secs(t.signed_duration_since(base))
}

/// A duration as fractional seconds (nanosecond resolution when it fits).
#[inline]
pub fn duration_secs(d: Duration) -> f64 {
    match d.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => d.num_milliseconds() as f64 / 1e3,
    }
}

/// The instant `secs` seconds after `base`, rounded to the nearest nanosecond.
#[inline]
pub fn at_offset(base: DateTime<Utc>, secs: f64) -> DateTime<Utc> {
    base + Duration::nanoseconds((secs * 1e9).round() as i64)
}
