//! # railtrack-core: Pure Inventory Logic for Railtrack
//!
//! This crate holds everything the Railtrack client decides without touching
//! the network, the file system or a camera.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Railtrack Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI layer (external)                          │   │
//! │  │    Login ──► Dashboard ──► Database table ──► Details / Scan    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ subscribe / call                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 railtrack-client (I/O)                          │   │
//! │  │    SessionManager, InventoryView, ScanSession, HTTP API         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ railtrack-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   query   │  │   table   │  │   guard   │  │   │
//! │  │   │  Record   │  │  filter   │  │ QuerySpec │  │  Session  │  │   │
//! │  │   │  Status   │  │  sort     │  │ mutations │  │  Route    │  │   │
//! │  │   │  Form     │  │  paginate │  │           │  │  decide   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Inventory records, registration form, report payloads
//! - [`query`] - Filter / sort / paginate engine
//! - [`table`] - Table interaction state driving the engine
//! - [`guard`] - Session value, auth state machine, route gating
//! - [`summary`] - Dashboard statistics
//! - [`validation`] - Registration form and identifier rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use railtrack_core::query::{query, QuerySpec};
//! use railtrack_core::types::InventoryRecord;
//!
//! let records = vec![
//!     InventoryRecord::new("B", "Rail", "X"),
//!     InventoryRecord::new("A", "Rail", "Y"),
//! ];
//!
//! let page = query(&records, &QuerySpec::default(), 10);
//! assert_eq!(page.total_pages, 1);
//! assert_eq!(page.items[0].id, "A");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod guard;
pub mod query;
pub mod summary;
pub mod table;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use guard::{AccessGuard, AuthEvent, AuthState, GuardDecision, Route, Session};
pub use query::{query, Page, QuerySpec, SortDirection, SortField};
pub use summary::{InventorySummary, TypeCount};
pub use table::{InventoryTable, SortIndicator};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Rows shown per page in the inventory table.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Warranty applied when the registration form leaves it untouched.
pub const DEFAULT_WARRANTY_YEARS: u32 = 10;

/// Upper bound for the warranty field.
///
/// ## Business Reason
/// Catches typos like 100 instead of 10; no rail component is rated beyond this.
pub const MAX_WARRANTY_YEARS: u32 = 50;

/// Maximum length of a component identifier accepted from a scan or URL.
pub const MAX_COMPONENT_ID_LEN: usize = 64;
