//! Cross-references the warehouse rows with the route service response.

use std::collections::HashSet;

use crate::models::WarehouseRow;

/// Highlight applied to a warehouse row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowHighlight {
    /// Row belongs to a route returned by the route service
    Selected,
    /// Row belongs to the store that rejected the previous delivery
    Rejected,
    None,
}

impl RowHighlight {
    pub fn style(&self) -> &'static str {
        match self {
            RowHighlight::Selected => "background-color: #FFD700; color: #000000",
            RowHighlight::Rejected => "background-color: #FF0000; color: #FFFFFF",
            RowHighlight::None => "",
        }
    }
}

/// Rejection state relevant to highlighting and inventory totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rejection {
    pub recalculation: bool,
    /// Recorded when a route was calculated in recalculation mode
    pub store: Option<i64>,
}

impl Rejection {
    fn active_store(&self) -> Option<i64> {
        if self.recalculation {
            self.store
        } else {
            None
        }
    }
}

/// Highlight for a single row, first matching rule wins.
pub fn highlight_row(
    row: &WarehouseRow,
    selected: &HashSet<&str>,
    rejection: Rejection,
) -> RowHighlight {
    if selected.contains(row.id_trazo.as_str()) {
        RowHighlight::Selected
    } else if rejection.active_store() == Some(row.tda_cve) {
        RowHighlight::Rejected
    } else {
        RowHighlight::None
    }
}

pub fn highlight_rows(
    rows: &[WarehouseRow],
    selected: &HashSet<&str>,
    rejection: Rejection,
) -> Vec<RowHighlight> {
    rows.iter()
        .map(|row| highlight_row(row, selected, rejection))
        .collect()
}

/// Inventory on hand summed over distinct stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryTotal {
    pub total: i64,
    pub excludes_rejected: bool,
}

/// Sum inventory once per store (first row per store wins), leaving out the
/// rejected store while recalculating.
pub fn inventory_total(rows: &[WarehouseRow], rejection: Rejection) -> InventoryTotal {
    let excluded = rejection.active_store();
    let mut seen = HashSet::new();
    let total = rows
        .iter()
        .filter(|row| seen.insert(row.tda_cve))
        .filter(|row| Some(row.tda_cve) != excluded)
        .map(|row| row.inventario_oh)
        .sum();

    InventoryTotal {
        total,
        excludes_rejected: excluded.is_some(),
    }
}
