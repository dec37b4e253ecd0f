//! # Validation Module
//!
//! Input rules for the registration form and for identifiers arriving from a
//! scan or a URL.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI form                                                      │
//! │  └── required markers, date pickers                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── required text, date format, warranty range                        │
//! │  ├── coordinate pairs and ranges                                       │
//! │  └── ComponentForm ──► NewComponent (typed)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Inventory API                                                │
//! │  └── assigns the id, derives status and expiry                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use railtrack_core::types::ComponentForm;
//! use railtrack_core::validation::validate_component_form;
//!
//! let form = ComponentForm {
//!     component_type: "Rail Clip".into(),
//!     material: "Spring Steel".into(),
//!     vendor_name: "Acme".into(),
//!     batch_no: "B-2024-07".into(),
//!     manufacturing_date: "2024-07-01".into(),
//!     ..ComponentForm::default()
//! };
//!
//! let payload = validate_component_form(&form).unwrap();
//! assert_eq!(payload.warranty_years, 10);
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::{ComponentForm, NewComponent};
use crate::{MAX_COMPONENT_ID_LEN, MAX_WARRANTY_YEARS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_TEXT_LEN: usize = 200;
const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// String Validators
// =============================================================================

/// Trims and checks a required text field.
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(value.to_string())
}

/// Trims an optional text field; blank becomes `None`.
fn optional_text(field: &str, value: &str) -> ValidationResult<Option<String>> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        validate_required_text(field, value).map(Some)
    }
}

/// Validates a component identifier taken from a scan or URL.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_COMPONENT_ID_LEN`] characters
/// - Letters, digits, hyphens and underscores only (it becomes a path segment)
///
/// ## Example
/// ```rust
/// use railtrack_core::validation::validate_component_id;
///
/// assert_eq!(validate_component_id(" aB3dE9xZ\n").unwrap(), "aB3dE9xZ");
/// assert!(validate_component_id("../etc").is_err());
/// ```
pub fn validate_component_id(id: &str) -> ValidationResult<String> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "component_id".to_string(),
        });
    }

    if id.chars().count() > MAX_COMPONENT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "component_id".to_string(),
            max: MAX_COMPONENT_ID_LEN,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "component_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(id.to_string())
}

// =============================================================================
// Date and Numeric Validators
// =============================================================================

/// Parses a `YYYY-MM-DD` date.
pub fn validate_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

/// Validates the warranty in whole years.
///
/// ## Rules
/// - Whole number
/// - Between 1 and [`MAX_WARRANTY_YEARS`]
pub fn validate_warranty_years(value: &str) -> ValidationResult<u32> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: "warranty_years".to_string(),
        });
    }

    let years: u32 = value.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "warranty_years".to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    if years == 0 || years > MAX_WARRANTY_YEARS {
        return Err(ValidationError::OutOfRange {
            field: "warranty_years".to_string(),
            min: 1.0,
            max: MAX_WARRANTY_YEARS as f64,
        });
    }

    Ok(years)
}

fn validate_coordinate(field: &str, value: &str, limit: f64) -> ValidationResult<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a decimal number".to_string(),
        })?;

    if !parsed.is_finite() || parsed < -limit || parsed > limit {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: -limit,
            max: limit,
        });
    }

    Ok(parsed)
}

/// Validates a latitude / longitude pair. Both blank is fine; one alone is not.
pub fn validate_location(lat: &str, lon: &str) -> ValidationResult<Option<(f64, f64)>> {
    match (lat.trim().is_empty(), lon.trim().is_empty()) {
        (true, true) => Ok(None),
        (false, true) => Err(ValidationError::MissingPair {
            field: "location_lat".to_string(),
            other: "location_lon".to_string(),
        }),
        (true, false) => Err(ValidationError::MissingPair {
            field: "location_lon".to_string(),
            other: "location_lat".to_string(),
        }),
        (false, false) => Ok(Some((
            validate_coordinate("location_lat", lat, 90.0)?,
            validate_coordinate("location_lon", lon, 180.0)?,
        ))),
    }
}

// =============================================================================
// Form Validator
// =============================================================================

/// Validates the whole registration form and builds the API payload.
///
/// Stops at the first failing field, in form order.
pub fn validate_component_form(form: &ComponentForm) -> ValidationResult<NewComponent> {
    let component_type = validate_required_text("component_type", &form.component_type)?;
    let material = validate_required_text("material", &form.material)?;
    let vendor_name = validate_required_text("vendor_name", &form.vendor_name)?;
    let batch_no = validate_required_text("batch_no", &form.batch_no)?;
    let manufacturing_date = validate_date("manufacturing_date", &form.manufacturing_date)?;
    let warranty_years = validate_warranty_years(&form.warranty_years)?;

    let installation_date = if form.installation_date.trim().is_empty() {
        None
    } else {
        let date = validate_date("installation_date", &form.installation_date)?;
        if date < manufacturing_date {
            return Err(ValidationError::DateOrder {
                field: "installation_date".to_string(),
                other: "manufacturing_date".to_string(),
            });
        }
        Some(date)
    };

    let track_section_id = optional_text("track_section_id", &form.track_section_id)?;
    let location = validate_location(&form.location_lat, &form.location_lon)?;

    Ok(NewComponent {
        component_type,
        material,
        vendor_name,
        batch_no,
        manufacturing_date,
        warranty_years,
        installation_date,
        track_section_id,
        location_lat: location.map(|(lat, _)| lat),
        location_lon: location.map(|(_, lon)| lon),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
