//! # Error Types
//!
//! Domain-specific error types for railtrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  railtrack-core errors (this file)                                     │
//! │  ├── CoreError        - Lookup / parsing failures                      │
//! │  └── ValidationError  - Registration form failures                     │
//! │                                                                         │
//! │  railtrack-client errors (separate crate)                              │
//! │  └── ClientError      - Auth, fetch, not-found, decode, storage        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → Notification        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The query engine itself never fails: out-of-range input is clamped, so
//! nothing in [`crate::query`] returns these types.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Component identifier is not present in the current snapshot.
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// Column name does not map to a sortable field.
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    /// Path does not map to any view of the application.
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by [`crate::validation`] before a registration is sent upstream.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Invalid format (e.g., invalid date, non-numeric coordinate).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// One half of a paired field was given without the other.
    #[error("{field} requires {other}")]
    MissingPair { field: String, other: String },

    /// Dates are in an impossible order.
    #[error("{field} cannot be before {other}")]
    DateOrder { field: String, other: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
