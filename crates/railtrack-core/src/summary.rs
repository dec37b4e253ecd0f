//! # Inventory Summary
//!
//! Dashboard statistics over one snapshot: totals by status and a per-type
//! breakdown for the chart.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::InventoryRecord;

/// Number of components of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TypeCount {
    pub component_type: String,
    pub count: usize,
}

/// Dashboard figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub total: usize,
    pub installed: usize,
    /// Everything that is not installed.
    pub in_storage: usize,
    /// Ordered by first appearance in the snapshot.
    pub by_type: Vec<TypeCount>,
}

impl InventorySummary {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        let total = records.len();
        let installed = records.iter().filter(|r| r.status.is_installed()).count();

        let mut by_type: Vec<TypeCount> = Vec::new();
        for record in records {
            match by_type
                .iter_mut()
                .find(|t| t.component_type == record.component_type)
            {
                Some(entry) => entry.count += 1,
                None => by_type.push(TypeCount {
                    component_type: record.component_type.clone(),
                    count: 1,
                }),
            }
        }

        InventorySummary {
            total,
            installed,
            in_storage: total - installed,
            by_type,
        }
    }
}
