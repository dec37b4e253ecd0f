//! # Record Query Engine
//!
//! Turns the full inventory snapshot plus a [`QuerySpec`] into the one page
//! the table shows.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     query(records, spec, page_size)                     │
//! │                                                                         │
//! │  records (snapshot, never mutated)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. FILTER   id / type / vendor contains filter_text (case-insensitive) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. SORT     stable ascending by sort_key, then reverse if Descending   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. PAGINATE total_pages = ceil(n / page_size), clamp page, slice       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Page { items, total_pages, page, total_items }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tie-break Policy
//! Descending reverses the *ascending result*, not the comparator. Equal keys
//! therefore come out in reverse filter order when descending, and the
//! descending list is always the exact mirror of the ascending one.
//!
//! The engine never fails. Page numbers and page sizes are clamped.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::InventoryRecord;

// =============================================================================
// Sort Field
// =============================================================================

/// A sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Type,
    Vendor,
    BatchNo,
    Status,
}

impl SortField {
    /// Every sortable column, in table order.
    pub const ALL: [SortField; 5] = [
        SortField::Id,
        SortField::Type,
        SortField::Vendor,
        SortField::BatchNo,
        SortField::Status,
    ];

    /// Wire name of the column (`component_id`, `vendor_name`, ...).
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "component_id",
            SortField::Type => "component_type",
            SortField::Vendor => "vendor_name",
            SortField::BatchNo => "batch_no",
            SortField::Status => "status",
        }
    }

    /// Resolves a column name, falling back to [`SortField::Id`].
    pub fn from_column_or_id(column: &str) -> Self {
        column.parse().unwrap_or(SortField::Id)
    }

    fn key<'a>(&self, record: &'a InventoryRecord) -> &'a str {
        match self {
            SortField::Id => &record.id,
            SortField::Type => &record.component_type,
            SortField::Vendor => &record.vendor,
            SortField::BatchNo => &record.batch_no,
            SortField::Status => record.status.as_str(),
        }
    }

    fn compare(&self, a: &InventoryRecord, b: &InventoryRecord) -> Ordering {
        self.key(a).cmp(self.key(b))
    }
}

impl FromStr for SortField {
    type Err = CoreError;

    /// Accepts both wire names and short names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "component_id" | "id" => Ok(SortField::Id),
            "component_type" | "type" => Ok(SortField::Type),
            "vendor_name" | "vendor" => Ok(SortField::Vendor),
            "batch_no" => Ok(SortField::BatchNo),
            "status" => Ok(SortField::Status),
            other => Err(CoreError::UnknownSortField(other.to_string())),
        }
    }
}

// =============================================================================
// Sort Direction
// =============================================================================

/// Sort direction for the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The other direction.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

// =============================================================================
// Query Spec
// =============================================================================

/// User-controlled parameters deciding which slice of the inventory is visible.
///
/// ## Invariants
/// - `page >= 1` (0 is read as 1)
/// - `sort_key == None` keeps the filter order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuerySpec {
    pub filter_text: String,
    pub sort_key: Option<SortField>,
    pub sort_direction: SortDirection,
    pub page: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        QuerySpec {
            filter_text: String::new(),
            sort_key: Some(SortField::Id),
            sort_direction: SortDirection::Ascending,
            page: 1,
        }
    }
}

impl QuerySpec {
    /// Sets the sort column by name.
    ///
    /// An unknown column falls back to `id` ascending.
    pub fn with_sort_column(mut self, column: &str, direction: SortDirection) -> Self {
        match column.parse::<SortField>() {
            Ok(field) => {
                self.sort_key = Some(field);
                self.sort_direction = direction;
            }
            Err(_) => {
                self.sort_key = Some(SortField::Id);
                self.sort_direction = SortDirection::Ascending;
            }
        }
        self
    }
}

// =============================================================================
// Page
// =============================================================================

/// One bounded slice of query results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Page<T> {
    /// At most `page_size` items.
    pub items: Vec<T>,
    /// `ceil(total_items / page_size)`; 0 when nothing matched.
    pub total_pages: usize,
    /// The page actually shown after clamping (always >= 1).
    pub page: usize,
    /// Number of records that passed the filter.
    pub total_items: usize,
}

impl<T> Page<T> {
    /// An empty first page.
    pub fn empty() -> Self {
        Page {
            items: Vec::new(),
            total_pages: 0,
            page: 1,
            total_items: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page::empty()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Runs filter → sort → paginate over an immutable snapshot.
///
/// ## Example
/// ```rust
/// use railtrack_core::query::{query, QuerySpec};
/// use railtrack_core::types::InventoryRecord;
///
/// let records = vec![InventoryRecord::new("A1", "Liner", "Acme")];
/// let spec = QuerySpec { filter_text: "a1".into(), ..QuerySpec::default() };
///
/// let page = query(&records, &spec, 10);
/// assert_eq!(page.items.len(), 1);
/// ```
pub fn query(
    records: &[InventoryRecord],
    spec: &QuerySpec,
    page_size: usize,
) -> Page<InventoryRecord> {
    let mut matched = filter_records(records, &spec.filter_text);

    if let Some(key) = spec.sort_key {
        sort_records(&mut matched, key, spec.sort_direction);
    }

    paginate(&matched, spec.page, page_size)
}

/// Keeps records whose id, type or vendor contains `filter_text`, ignoring case.
pub fn filter_records<'a>(
    records: &'a [InventoryRecord],
    filter_text: &str,
) -> Vec<&'a InventoryRecord> {
    if filter_text.is_empty() {
        return records.iter().collect();
    }

    let needle = filter_text.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.id.to_lowercase().contains(&needle)
                || r.component_type.to_lowercase().contains(&needle)
                || r.vendor.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort by `key`; descending reverses the ascending result.
pub fn sort_records(records: &mut [&InventoryRecord], key: SortField, direction: SortDirection) {
    // slice::sort_by is stable
    records.sort_by(|a, b| key.compare(a, b));

    if direction == SortDirection::Descending {
        records.reverse();
    }
}

/// Number of pages needed for `count` items. A page size of 0 counts as 1.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Clamps `page` into `[1, max(total_pages, 1)]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slices one page out of already filtered and sorted items.
pub fn paginate<T: Clone>(items: &[&T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let page = clamp_page(page, total_pages);

    let start = ((page - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);

    Page {
        items: items[start..end].iter().map(|r| (*r).clone()).collect(),
        total_pages,
        page,
        total_items,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
