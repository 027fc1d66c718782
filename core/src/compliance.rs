//! Dispatch compliance against the expected-orders master list.

use crate::model::{MasterOrder, PickingRecord};
use std::collections::HashSet;

/// Percentage of distinct expected documents that have been packed.
///
/// A document counts as packed once any picking record for it carries a
/// non-blank packing operator. Documents outside the master list are not
/// counted, so the result stays within `0.0..=100.0`. An empty master list
/// yields 0.0.
pub fn compliance(picking: &[PickingRecord], expected: &[MasterOrder]) -> f64 {
    let expected: HashSet<&str> = expected
        .iter()
        .map(|m| m.document.trim())
        .filter(|d| !d.is_empty())
        .collect();
    if expected.is_empty() {
        return 0.0;
    }

    let packed: HashSet<&str> = picking
        .iter()
        .filter(|o| o.packer().is_some())
        .map(|o| o.document.trim())
        .filter(|d| expected.contains(d))
        .collect();

    packed.len() as f64 / expected.len() as f64 * 100.0
}
