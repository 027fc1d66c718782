//! Date-window and free-text filters applied upstream of aggregation.

use crate::{
    error::{TrackError, TrackResult},
    model::{ConditioningRecord, PickingRecord, ReceptionRecord, RecordSet, StorageRecord},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` window over ISO `YYYY-MM-DD` dates.
///
/// ISO dates order lexicographically, so containment is a plain string
/// comparison once both bounds are known to be valid dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: String,
    end: String,
}

/// Unvalidated wire form; deserialization goes through `DateRange::new`.
#[derive(Deserialize)]
struct RawDateRange {
    start: String,
    end: String,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = TrackError;

    fn try_from(raw: RawDateRange) -> TrackResult<Self> {
        Self::new(&raw.start, &raw.end)
    }
}

impl DateRange {
    pub fn new(start: &str, end: &str) -> TrackResult<Self> {
        let invalid = || TrackError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        };
        let from = NaiveDate::parse_from_str(start, "%Y-%m-%d").map_err(|_| invalid())?;
        let to = NaiveDate::parse_from_str(end, "%Y-%m-%d").map_err(|_| invalid())?;
        if from > to {
            return Err(invalid());
        }
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn contains(&self, date: &str) -> bool {
        date >= self.start.as_str() && date <= self.end.as_str()
    }
}

/// Anything carrying a record date.
pub trait Dated {
    fn date(&self) -> &str;
}

macro_rules! impl_dated {
    ($($ty:ty),* $(,)?) => {
        $(impl Dated for $ty {
            fn date(&self) -> &str {
                &self.date
            }
        })*
    };
}

impl_dated!(PickingRecord, ReceptionRecord, ConditioningRecord, StorageRecord);

/// The subsequence of `records` dated within `range`, order preserved.
pub fn filter_by_date<T: Dated + Clone>(records: &[T], range: &DateRange) -> Vec<T> {
    records
        .iter()
        .filter(|r| range.contains(r.date()))
        .cloned()
        .collect()
}

impl RecordSet {
    /// A copy of this set restricted to `range`.
    pub fn within(&self, range: &DateRange) -> RecordSet {
        RecordSet {
            picking: filter_by_date(&self.picking, range),
            reception: filter_by_date(&self.reception, range),
            conditioning: filter_by_date(&self.conditioning, range),
            storage: filter_by_date(&self.storage, range),
        }
    }
}

// ── Text search ──────────────────────────────────────────────────────────────

/// Case-insensitive substring search over a record's descriptive fields.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    /// An empty query matches every record.
    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl Searchable for PickingRecord {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.document.as_str(), self.operator.as_str(), self.client.as_str()];
        fields.extend(self.packing_operator.as_deref());
        fields
    }
}

impl Searchable for ReceptionRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.document.as_str(),
            self.operator.as_str(),
            self.supplier.as_str(),
        ]
    }
}

impl Searchable for ConditioningRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.document.as_str(),
            self.operator.as_str(),
            self.client.as_str(),
        ]
    }
}

impl Searchable for StorageRecord {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.operator.as_str(),
            self.entry_location.as_str(),
            self.exit_location.as_str(),
        ];
        fields.extend(self.product_code.as_deref());
        fields
    }
}

pub fn search<T: Searchable + Clone>(records: &[T], query: &str) -> Vec<T> {
    records.iter().filter(|r| r.matches(query)).cloned().collect()
}
