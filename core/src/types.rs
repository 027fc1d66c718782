//! Shared primitive types used across the whole crate.

/// A stable, unique identifier for any stored record.
pub type RecordId = String;

/// Operators are referenced by name from every process record.
pub type OperatorName = String;

/// An ISO `YYYY-MM-DD` calendar date as stored on records.
pub type IsoDate = String;

/// Minutes are floored to this value whenever a record is created.
pub const MIN_DURATION_MINUTES: u32 = 1;

/// Minutes per hour, the denominator of every L/H rate.
pub const MINUTES_PER_HOUR: f64 = 60.0;
