// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

pub const MICROS_PER_SEC: i64 = 1_000_000;
pub const DAY_MICROS: i64 = 24 * 3600 * MICROS_PER_SEC;

// BASE_TIME is used to decide whether an integer timestamp is in
// seconds, milliseconds, microseconds or nanoseconds
static BASE_TIME: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(1971, 1, 1, 0, 0, 0).unwrap());

#[inline(always)]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[inline(always)]
pub fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

#[inline(always)]
pub fn micros_to_datetime(micros: i64) -> DateTime<Utc> {
    Utc.timestamp_micros(micros)
        .single()
        .unwrap_or_else(|| *BASE_TIME)
}

/// RFC3339 → microseconds since epoch, UTC
pub fn parse_str_to_timestamp_micros(s: &str) -> Result<i64, chrono::ParseError> {
    let dt = DateTime::parse_from_rfc3339(s)?;
    Ok(dt.with_timezone(&Utc).timestamp_micros())
}

/// Normalize an integer epoch timestamp of unknown precision to
/// microseconds. Zero means "now".
pub fn parse_i64_to_timestamp_micros(v: i64) -> i64 {
    if v == 0 {
        return now_micros();
    }
    let mut duration = v;
    if duration > BASE_TIME.timestamp_nanos_opt().unwrap_or_default() {
        // nanoseconds
        duration /= 1000;
    } else if duration > BASE_TIME.timestamp_micros() {
        // microseconds
    } else if duration > BASE_TIME.timestamp_millis() {
        // milliseconds
        duration *= 1000;
    } else {
        // seconds
        duration *= MICROS_PER_SEC;
    }
    duration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let micros = parse_str_to_timestamp_micros("2025-01-02T03:04:05Z").unwrap();
        assert_eq!(micros, 1735787045000000);
        assert!(parse_str_to_timestamp_micros("not a date").is_err());
    }

    #[test]
    fn test_parse_i64_precisions() {
        let secs = 1735787045i64;
        let want = secs * MICROS_PER_SEC;
        assert_eq!(parse_i64_to_timestamp_micros(secs), want);
        assert_eq!(parse_i64_to_timestamp_micros(secs * 1000), want);
        assert_eq!(parse_i64_to_timestamp_micros(want), want);
        assert_eq!(parse_i64_to_timestamp_micros(want * 1000), want);
    }

    #[test]
    fn test_micros_roundtrip() {
        let micros = 1735787045000000;
        assert_eq!(micros_to_datetime(micros).timestamp_micros(), micros);
    }
}
