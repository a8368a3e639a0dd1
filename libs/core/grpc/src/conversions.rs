//! Protobuf well-known `Timestamp` ↔ `chrono::DateTime<Utc>`
//!
//! Both directions validate against the protobuf Timestamp contract:
//! - `nanos` must lie in `[0, 1e9)`
//! - the instant must lie within `0001-01-01T00:00:00Z ..= 9999-12-31T23:59:59.999999999Z`
//!
//! ## Usage
//!
//! ```ignore
//! use grpc_client::conversions::*;
//! use chrono::Utc;
//!
//! let ts = datetime_to_timestamp(Utc::now())?;
//! let dt = timestamp_to_datetime(&ts)?;
//! ```

use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use thiserror::Error;

/// Seconds of 0001-01-01T00:00:00Z relative to the Unix epoch.
pub const MIN_VALID_SECONDS: i64 = -62_135_596_800;

/// Seconds of 10000-01-01T00:00:00Z relative to the Unix epoch (exclusive bound).
pub const MAX_VALID_SECONDS: i64 = 253_402_300_800;

/// A timestamp that cannot cross the wire/domain boundary.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TimestampError {
  #[error("timestamp: nil Timestamp")]
  Missing,

  #[error("timestamp: seconds:{seconds} nanos:{nanos}: nanos not in range [0, 1e9)")]
  InvalidNanos { seconds: i64, nanos: i64 },

  #[error("timestamp: seconds:{0} before 0001-01-01")]
  TooEarly(i64),

  #[error("timestamp: seconds:{0} after 10000-01-01")]
  TooLate(i64),
}

fn validate(seconds: i64, nanos: i64) -> Result<(), TimestampError> {
  if seconds < MIN_VALID_SECONDS {
    return Err(TimestampError::TooEarly(seconds));
  }
  if seconds >= MAX_VALID_SECONDS {
    return Err(TimestampError::TooLate(seconds));
  }
  if !(0..1_000_000_000).contains(&nanos) {
    return Err(TimestampError::InvalidNanos { seconds, nanos });
  }
  Ok(())
}

/// Convert a wire timestamp to `DateTime<Utc>`, rejecting malformed values
pub fn timestamp_to_datetime(ts: &Timestamp) -> Result<DateTime<Utc>, TimestampError> {
  validate(ts.seconds, i64::from(ts.nanos))?;

  // validate() guarantees the nanos fit in u32 and the instant is within chrono's range.
  DateTime::from_timestamp(ts.seconds, ts.nanos as u32).ok_or(TimestampError::TooLate(ts.seconds))
}

/// Like [`timestamp_to_datetime`], treating an absent field as malformed
pub fn required_timestamp_to_datetime(
  ts: Option<&Timestamp>,
) -> Result<DateTime<Utc>, TimestampError> {
  ts.ok_or(TimestampError::Missing).and_then(timestamp_to_datetime)
}

/// Convert `DateTime<Utc>` to a wire timestamp
///
/// Fails when the instant falls outside the protobuf Timestamp range (the
/// store can hold dates the wire format cannot) or sits on a leap second.
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> Result<Timestamp, TimestampError> {
  let seconds = dt.timestamp();
  let nanos = i64::from(dt.timestamp_subsec_nanos());
  validate(seconds, nanos)?;

  Ok(Timestamp {
    seconds,
    nanos: nanos as i32,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_timestamp_roundtrip_keeps_nanos() {
    let dt = Utc.with_ymd_and_hms(2019, 10, 17, 20, 34, 58).unwrap()
      + chrono::Duration::nanoseconds(651_387_237);
    let ts = datetime_to_timestamp(dt).unwrap();
    assert_eq!(ts.nanos, 651_387_237);
    assert_eq!(timestamp_to_datetime(&ts).unwrap(), dt);
  }

  #[test]
  fn test_negative_nanos_rejected() {
    let ts = Timestamp { seconds: 10, nanos: -1 };
    assert_eq!(
      timestamp_to_datetime(&ts),
      Err(TimestampError::InvalidNanos { seconds: 10, nanos: -1 })
    );
  }

  #[test]
  fn test_nanos_overflow_rejected() {
    let ts = Timestamp { seconds: 0, nanos: 1_000_000_000 };
    assert!(matches!(timestamp_to_datetime(&ts), Err(TimestampError::InvalidNanos { .. })));
  }

  #[test]
  fn test_range_bounds() {
    let first = Timestamp { seconds: MIN_VALID_SECONDS, nanos: 0 };
    assert!(timestamp_to_datetime(&first).is_ok());

    let before = Timestamp { seconds: MIN_VALID_SECONDS - 1, nanos: 0 };
    assert_eq!(timestamp_to_datetime(&before), Err(TimestampError::TooEarly(MIN_VALID_SECONDS - 1)));

    let last = Timestamp { seconds: MAX_VALID_SECONDS - 1, nanos: 999_999_999 };
    assert!(timestamp_to_datetime(&last).is_ok());

    let after = Timestamp { seconds: MAX_VALID_SECONDS, nanos: 0 };
    assert_eq!(timestamp_to_datetime(&after), Err(TimestampError::TooLate(MAX_VALID_SECONDS)));
  }

  #[test]
  fn test_missing_timestamp() {
    assert_eq!(required_timestamp_to_datetime(None), Err(TimestampError::Missing));
    assert_eq!(TimestampError::Missing.to_string(), "timestamp: nil Timestamp");
  }

  #[test]
  fn test_datetime_outside_wire_range() {
    let far_future = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    assert!(matches!(datetime_to_timestamp(far_future), Err(TimestampError::TooLate(_))));
  }
}
