use chrono::{DateTime, FixedOffset, TimeZone, Timelike};
use serde::{de, Deserialize, Deserializer};

use crate::error::{ApiError, ApiResult};

/// Ensures `from` lies strictly before `to`.
///
/// Zero-length intervals are rejected the same way as reversed ones.
pub fn ensure_ordered(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> ApiResult<()> {
  if from == to {
    return Err(ApiError::InvalidInterval(
      "Time event cannot start and end at the same time".to_string(),
    ));
  }

  if from > to {
    return Err(ApiError::InvalidInterval(
      "Time event cannot start after it has ended".to_string(),
    ));
  }

  Ok(())
}

/// First and last instant of the calendar day of `ts`, in the offset of `ts`.
pub fn day_bounds(ts: DateTime<FixedOffset>) -> ApiResult<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
  let offset = *ts.offset();
  let date = ts.date_naive();

  let start = date
    .and_hms_opt(0, 0, 0)
    .and_then(|start| offset.from_local_datetime(&start).single());
  let end = date
    .and_hms_milli_opt(23, 59, 59, 999)
    .and_then(|end| offset.from_local_datetime(&end).single());

  match (start, end) {
    (Some(start), Some(end)) => Ok((start, end)),
    _ => Err(ApiError::InvalidTimestamp(format!("day of {ts} cannot be represented"))),
  }
}

const NANOS_PER_MILLI: u32 = 1_000_000;
const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Strict RFC 3339 parsing shared by request bodies and path segments.
///
/// Stored intervals are compared as epoch milliseconds, so timestamps finer than
/// a millisecond or falling on a leap second are refused instead of rounded.
pub fn parse_rfc3339(value: &str) -> Result<DateTime<FixedOffset>, String> {
  let ts = DateTime::parse_from_rfc3339(value).map_err(|e| format!("`{value}` is not an RFC3339 timestamp: {e}"))?;

  if ts.nanosecond() >= NANOS_PER_SECOND {
    return Err(format!("`{value}` falls on a leap second"));
  }

  if ts.nanosecond() % NANOS_PER_MILLI != 0 {
    return Err(format!("`{value}` is more precise than a millisecond"));
  }

  Ok(ts)
}

/// Parses a timestamp taken from a path segment.
pub fn parse_timestamp(name: &str, value: &str) -> ApiResult<DateTime<FixedOffset>> {
  parse_rfc3339(value)
    .map_err(|_| ApiError::InvalidTimestamp(format!("{name} arg must be a valid RFC3339 compliant string")))
}

pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = String::deserialize(deserializer)?;
  parse_rfc3339(&value).map_err(de::Error::custom)
}

pub fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<String>::deserialize(deserializer)? {
    Some(value) => parse_rfc3339(&value).map(Some).map_err(de::Error::custom),
    None => Ok(None),
  }
}
