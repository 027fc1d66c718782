//! Boundary coercion for externally supplied record values.
//!
//! RULE: everything numeric that enters a record passes through here.
//! Aggregation code downstream assumes well-typed non-negative numbers.

use crate::{
    error::{TrackError, TrackResult},
    types::MIN_DURATION_MINUTES,
};
use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce any JSON value to a non-negative integer.
///
/// Numbers are floored, numeric strings are trimmed and parsed.
/// Negative, non-finite, non-numeric and missing values all become 0.
pub fn non_negative_or_zero(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(floor_positive))
            .unwrap_or(0),
        Value::String(s) => parse_count(s),
        _ => 0,
    }
}

/// Parse a free-text count the same way `non_negative_or_zero` treats strings.
pub fn parse_count(raw: &str) -> u64 {
    let trimmed = raw.trim();
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(floor_positive))
        .unwrap_or(0)
}

fn floor_positive(f: f64) -> Option<u64> {
    if f.is_finite() && f > 0.0 {
        Some(f.floor() as u64)
    } else {
        None
    }
}

/// serde adapter: any value → `u64`, never failing.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(non_negative_or_zero(&value))
}

/// serde adapter: `null` → `None`, anything else coerced like `lenient_count`.
pub fn lenient_opt_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(non_negative_or_zero(&other)),
    })
}

/// serde adapter for minute fields.
pub fn lenient_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(saturate_minutes(non_negative_or_zero(&value)))
}

/// serde adapter for optional minute fields.
pub fn lenient_opt_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(saturate_minutes(non_negative_or_zero(&other))),
    })
}

fn saturate_minutes(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// serde adapter for identifiers: remote backends hand out numeric ids,
/// the local store uses strings.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Minutes elapsed between two `HH:MM` wall-clock times.
///
/// The result is floored to `MIN_DURATION_MINUTES`, so an end time at or
/// before the start still yields one minute.
pub fn minutes_between(start: &str, end: &str) -> TrackResult<u32> {
    let start = parse_clock(start)?;
    let end = parse_clock(end)?;
    let elapsed = (end - start).num_minutes();
    Ok(floor_duration(elapsed))
}

/// Clamp a raw minute count into the valid duration range.
pub fn floor_duration(minutes: i64) -> u32 {
    let clamped = minutes.clamp(MIN_DURATION_MINUTES as i64, u32::MAX as i64);
    clamped as u32
}

fn parse_clock(raw: &str) -> TrackResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| TrackError::InvalidTime {
        value: raw.to_string(),
    })
}

/// Effective packing figure for a picking record.
///
/// A document often carries one combined figure for both roles: the
/// packing-specific value wins only when present and non-zero, otherwise
/// the picking value is used.
pub fn effective_packing(packing: Option<u64>, picking: u64) -> u64 {
    match packing {
        Some(value) if value > 0 => value,
        _ => picking,
    }
}

/// Trimmed operator name, or `None` when blank.
pub fn non_empty_name(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}
