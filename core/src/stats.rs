//! Operator productivity aggregation.
//!
//! A single linear pass folds the four process collections into one
//! accumulator per roster entry, then derives the L/H rates.
//!
//! RULES:
//!   - Accumulators are keyed by trimmed operator name.
//!   - Only roster-known names accumulate. Anything else is dropped.
//!   - Every rate is 0.0 when its minute denominator is zero.
//!   - Totals saturate at `u64::MAX`; aggregation never panics.
//!   - Output is one row per roster entry, in roster order.

use crate::{
    coerce::non_empty_name,
    model::{Operator, RecordSet},
    types::{OperatorName, MINUTES_PER_HOUR},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-operator totals and derived rates. Recomputed on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorMetrics {
    pub name: OperatorName,

    // Picking
    pub total_orders: u64,
    pub total_lines: u64,
    pub total_quantity: u64,
    pub total_pick_minutes: u64,
    pub pick_records: u64,

    // Packing
    pub total_pack_lines: u64,
    pub total_pack_quantity: u64,
    pub total_pack_minutes: u64,
    pub pack_records: u64,

    // Reception
    pub total_rec_lines: u64,
    pub total_rec_quantity: u64,
    pub total_rec_minutes: u64,
    pub rec_records: u64,

    // VAS
    pub total_vas_lines: u64,
    pub total_vas_quantity: u64,
    pub total_vas_minutes: u64,
    pub vas_records: u64,

    // Storage
    pub total_storage_quantity: u64,
    pub total_storage_minutes: u64,
    pub storage_records: u64,

    // Derived
    #[serde(rename = "avgDuration")]
    pub avg_pick_duration: f64,
    #[serde(rename = "efficiency")]
    pub pick_efficiency: f64,
    #[serde(rename = "packingEfficiency")]
    pub pack_efficiency: f64,
    pub reception_efficiency: f64,
    pub conditioning_efficiency: f64,
    pub storage_efficiency: f64,
}

impl OperatorMetrics {
    fn zeroed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// True when no record was attributed to this operator.
    pub fn is_idle(&self) -> bool {
        self.pick_records == 0
            && self.pack_records == 0
            && self.rec_records == 0
            && self.vas_records == 0
            && self.storage_records == 0
    }

    fn derive_rates(&mut self) {
        self.avg_pick_duration = ratio(self.total_pick_minutes, self.pick_records);
        self.pick_efficiency = per_hour(self.total_lines, self.total_pick_minutes);
        self.pack_efficiency = per_hour(self.total_pack_lines, self.total_pack_minutes);
        self.reception_efficiency = per_hour(self.total_rec_lines, self.total_rec_minutes);
        self.conditioning_efficiency = per_hour(self.total_vas_lines, self.total_vas_minutes);
        // Storage has no lines; its rate is units per hour.
        self.storage_efficiency = per_hour(self.total_storage_quantity, self.total_storage_minutes);
    }
}

/// `amount / (minutes / 60)`, or 0.0 with no minutes.
pub fn per_hour(amount: u64, minutes: u64) -> f64 {
    if minutes == 0 {
        0.0
    } else {
        amount as f64 / (minutes as f64 / MINUTES_PER_HOUR)
    }
}

/// Sum that clamps at `u64::MAX` instead of overflowing.
pub fn saturating_sum(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, u64::saturating_add)
}

fn bump(total: &mut u64, amount: u64) {
    *total = total.saturating_add(amount);
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Name → accumulator index. Duplicate roster names share one slot.
struct Ledger {
    slots: Vec<OperatorMetrics>,
    by_name: HashMap<String, usize>,
    row_slots: Vec<usize>,
}

impl Ledger {
    fn new(roster: &[Operator]) -> Self {
        let mut slots = Vec::with_capacity(roster.len());
        let mut by_name = HashMap::with_capacity(roster.len());
        let mut row_slots = Vec::with_capacity(roster.len());

        for op in roster {
            let key = op.name.trim();
            let slot = match by_name.get(key) {
                Some(&slot) => {
                    log::warn!(
                        "roster: duplicate operator name '{key}' (id {}); metrics are shared",
                        op.id
                    );
                    slot
                }
                None => {
                    slots.push(OperatorMetrics::zeroed(&op.name));
                    by_name.insert(key.to_string(), slots.len() - 1);
                    slots.len() - 1
                }
            };
            row_slots.push(slot);
        }

        Self {
            slots,
            by_name,
            row_slots,
        }
    }

    fn get(&mut self, name: &str) -> Option<&mut OperatorMetrics> {
        let key = non_empty_name(Some(name))?;
        let slot = *self.by_name.get(key)?;
        self.slots.get_mut(slot)
    }

    fn finish(mut self, roster: &[Operator]) -> Vec<OperatorMetrics> {
        for slot in &mut self.slots {
            slot.derive_rates();
        }
        self.row_slots
            .iter()
            .zip(roster)
            .map(|(&slot, op)| OperatorMetrics {
                name: op.name.clone(),
                ..self.slots[slot].clone()
            })
            .collect()
    }
}

/// Aggregate every collection in `records` onto the roster.
///
/// Pure and infallible: unknown or blank operator names are skipped,
/// empty collections produce all-zero rows.
pub fn aggregate(roster: &[Operator], records: &RecordSet) -> Vec<OperatorMetrics> {
    let mut ledger = Ledger::new(roster);
    let mut dropped = 0usize;

    for order in &records.picking {
        match ledger.get(&order.operator) {
            Some(m) => {
                bump(&mut m.total_orders, 1);
                bump(&mut m.pick_records, 1);
                bump(&mut m.total_lines, order.lines);
                bump(&mut m.total_quantity, order.quantity);
                bump(&mut m.total_pick_minutes, u64::from(order.duration_minutes));
            }
            None => dropped += 1,
        }

        // Packing is attributed independently of picking.
        if let Some(packer) = order.packer() {
            let same_operator = packer == order.operator.trim();
            if let Some(m) = ledger.get(packer) {
                bump(&mut m.pack_records, 1);
                bump(&mut m.total_pack_lines, order.effective_packing_lines());
                bump(&mut m.total_pack_quantity, order.effective_packing_quantity());
                bump(&mut m.total_pack_minutes, u64::from(order.packing_duration_minutes.unwrap_or(0)));
                // One physical order earns one credit per distinct operator.
                if !same_operator {
                    bump(&mut m.total_orders, 1);
                }
            }
        }
    }

    for rec in &records.reception {
        match ledger.get(&rec.operator) {
            Some(m) => {
                bump(&mut m.rec_records, 1);
                bump(&mut m.total_rec_lines, rec.lines);
                bump(&mut m.total_rec_quantity, rec.quantity);
                bump(&mut m.total_rec_minutes, u64::from(rec.duration_minutes));
            }
            None => dropped += 1,
        }
    }

    for vas in &records.conditioning {
        match ledger.get(&vas.operator) {
            Some(m) => {
                bump(&mut m.vas_records, 1);
                bump(&mut m.total_vas_lines, vas.lines);
                bump(&mut m.total_vas_quantity, vas.quantity);
                bump(&mut m.total_vas_minutes, u64::from(vas.duration_minutes));
            }
            None => dropped += 1,
        }
    }

    for mov in &records.storage {
        match ledger.get(&mov.operator) {
            Some(m) => {
                bump(&mut m.storage_records, 1);
                bump(&mut m.total_storage_quantity, mov.quantity);
                bump(&mut m.total_storage_minutes, u64::from(mov.duration_minutes));
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!("stats: {dropped} records reference operators outside the roster");
    }

    ledger.finish(roster)
}

/// Look up one operator's row by name.
pub fn metrics_for<'a>(metrics: &'a [OperatorMetrics], name: &str) -> Option<&'a OperatorMetrics> {
    let name = name.trim();
    metrics.iter().find(|m| m.name.trim() == name)
}
