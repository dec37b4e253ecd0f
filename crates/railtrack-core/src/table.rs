//! # Table Interaction State
//!
//! Owns the latest inventory snapshot and the [`QuerySpec`] the user is
//! editing, and keeps the visible [`Page`] in step with both.
//!
//! ## Interaction Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI Action               Method                  QuerySpec Change       │
//! │  ─────────               ──────                  ────────────────       │
//! │  Type in search box ───► set_filter_text() ────► filter, page = 1      │
//! │  Click column header ──► request_sort() ───────► toggle or new key     │
//! │  Previous / Next ──────► previous/next_page() ─► page ± 1 (clamped)    │
//! │  Fetch completed ──────► replace_records() ────► page re-clamped       │
//! │  Delete succeeded ─────► remove_record() ──────► page re-clamped       │
//! │                                                                         │
//! │  Every row above ends in recompute(): query() over the CURRENT         │
//! │  snapshot. No page is ever reused across a snapshot change.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::query::{query, Page, QuerySpec, SortDirection, SortField};
use crate::types::InventoryRecord;

/// Header icon state for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortIndicator {
    /// Column is sortable but not the active key.
    Unsorted,
    Ascending,
    Descending,
}

/// The inventory table: snapshot + query spec + visible page.
#[derive(Debug, Clone)]
pub struct InventoryTable {
    records: Vec<InventoryRecord>,
    spec: QuerySpec,
    page_size: usize,
    current: Page<InventoryRecord>,
}

impl InventoryTable {
    /// Creates an empty table with the default query spec.
    pub fn new(page_size: usize) -> Self {
        InventoryTable {
            records: Vec::new(),
            spec: QuerySpec::default(),
            page_size: page_size.max(1),
            current: Page::empty(),
        }
    }

    /// Creates a table over an initial snapshot.
    pub fn with_records(records: Vec<InventoryRecord>, page_size: usize) -> Self {
        let mut table = Self::new(page_size);
        table.replace_records(records);
        table
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The page currently on screen.
    pub fn page(&self) -> &Page<InventoryRecord> {
        &self.current
    }

    /// Finds a record in the snapshot by identifier.
    pub fn get(&self, id: &str) -> CoreResult<&InventoryRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::ComponentNotFound(id.to_string()))
    }

    pub fn has_next(&self) -> bool {
        self.current.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.current.has_previous()
    }

    /// Icon state for a column header.
    pub fn sort_indicator(&self, field: SortField) -> SortIndicator {
        match (self.spec.sort_key, self.spec.sort_direction) {
            (Some(active), SortDirection::Ascending) if active == field => SortIndicator::Ascending,
            (Some(active), SortDirection::Descending) if active == field => {
                SortIndicator::Descending
            }
            _ => SortIndicator::Unsorted,
        }
    }

    // =========================================================================
    // Snapshot Changes
    // =========================================================================

    /// Swaps in a freshly fetched snapshot and re-runs the full pipeline.
    pub fn replace_records(&mut self, records: Vec<InventoryRecord>) -> &Page<InventoryRecord> {
        self.records = records;
        self.recompute()
    }

    /// Drops one record locally (after a confirmed remote delete).
    ///
    /// Returns false when the id was not in the snapshot.
    pub fn remove_record(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    /// Empties the snapshot and resets the query spec.
    pub fn clear(&mut self) {
        self.records.clear();
        self.spec = QuerySpec::default();
        self.recompute();
    }

    // =========================================================================
    // User Interactions
    // =========================================================================

    /// Updates the search text. A new filter always starts from page 1.
    pub fn set_filter_text(&mut self, text: impl Into<String>) -> &Page<InventoryRecord> {
        self.spec.filter_text = text.into();
        self.spec.page = 1;
        self.recompute()
    }

    /// Header click: same column toggles direction, another column sorts
    /// ascending. The page number is kept.
    pub fn request_sort(&mut self, field: SortField) -> &Page<InventoryRecord> {
        if self.spec.sort_key == Some(field) {
            self.spec.sort_direction = self.spec.sort_direction.toggled();
        } else {
            self.spec.sort_key = Some(field);
            self.spec.sort_direction = SortDirection::Ascending;
        }
        self.recompute()
    }

    /// Header click by column name; unknown names sort by id ascending.
    pub fn request_sort_column(&mut self, column: &str) -> &Page<InventoryRecord> {
        match column.parse::<SortField>() {
            Ok(field) => self.request_sort(field),
            Err(_) => {
                self.spec.sort_key = Some(SortField::Id);
                self.spec.sort_direction = SortDirection::Ascending;
                self.recompute()
            }
        }
    }

    /// Jumps to page `n`, clamped to `[1, total_pages]`.
    pub fn go_to_page(&mut self, n: usize) -> &Page<InventoryRecord> {
        self.spec.page = n;
        self.recompute()
    }

    pub fn next_page(&mut self) -> &Page<InventoryRecord> {
        self.go_to_page(self.spec.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> &Page<InventoryRecord> {
        self.go_to_page(self.spec.page.saturating_sub(1))
    }

    fn recompute(&mut self) -> &Page<InventoryRecord> {
        self.current = query(&self.records, &self.spec, self.page_size);
        // keep the spec's page equal to what is on screen
        self.spec.page = self.current.page;
        &self.current
    }
}

impl Default for InventoryTable {
    fn default() -> Self {
        Self::new(crate::DEFAULT_PAGE_SIZE)
    }
}
