//! Headline KPI tiles for the operations dashboard.

use crate::{
    compliance::compliance,
    model::{MasterOrder, OrderStatus, RecordSet},
    stats::{saturating_sum, OperatorMetrics},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_orders: usize,
    pub processed_picking: usize,
    pub processed_packing: usize,
    pub total_lines: u64,
    pub total_units: u64,
    pub reception_units: u64,
    pub vas_units: u64,
    pub storage_units: u64,
    pub compliance_pct: f64,
    /// Mean picking L/H across the roster, idle operators included.
    pub team_pick_efficiency: f64,
}

impl DashboardSummary {
    pub fn build(
        records: &RecordSet,
        master: &[MasterOrder],
        metrics: &[OperatorMetrics],
    ) -> Self {
        let picking = &records.picking;
        let efficiency_sum: f64 = metrics.iter().map(|m| m.pick_efficiency).sum();

        Self {
            total_orders: picking.len(),
            processed_picking: picking
                .iter()
                .filter(|o| o.status == OrderStatus::Processed)
                .count(),
            processed_packing: picking
                .iter()
                .filter(|o| o.packing_status == Some(OrderStatus::Processed))
                .count(),
            total_lines: saturating_sum(picking.iter().map(|o| o.lines)),
            total_units: saturating_sum(picking.iter().map(|o| o.quantity)),
            reception_units: saturating_sum(records.reception.iter().map(|r| r.quantity)),
            vas_units: saturating_sum(records.conditioning.iter().map(|c| c.quantity)),
            storage_units: saturating_sum(records.storage.iter().map(|s| s.quantity)),
            compliance_pct: compliance(picking, master),
            team_pick_efficiency: efficiency_sum / metrics.len().max(1) as f64,
        }
    }
}
