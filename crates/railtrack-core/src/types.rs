//! # Domain Types
//!
//! Record and payload types exchanged with the inventory API.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │ InventoryRecord  │  │  NewComponent    │  │ CreatedComponent │      │
//! │  │ ───────────────  │  │ ───────────────  │  │ ───────────────  │      │
//! │  │ component_id     │  │ type / material  │  │ component        │      │
//! │  │ component_type   │  │ vendor / batch   │  │ svg_content      │      │
//! │  │ vendor_name      │  │ dates / warranty │  │ dxf_content      │      │
//! │  │ batch_no, status │  │ location         │  │                  │      │
//! │  │ + extra fields   │  │                  │  │                  │      │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pass-through Fields
//! The API returns more than the table shows (material, dates, location,
//! track section). Those land in [`InventoryRecord::extra`] untouched so the
//! details view can render them without the core interpreting them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Component Status
// =============================================================================

/// Lifecycle status of a tracked component.
///
/// The API sends plain strings. Anything other than the two known values is
/// kept verbatim in [`ComponentStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ComponentStatus {
    /// Fitted on track.
    Installed,
    /// Registered but not yet fitted.
    InStorage,
    /// Any other value reported by the server.
    Other(String),
}

impl ComponentStatus {
    /// Display string, also used as the sort key.
    pub fn as_str(&self) -> &str {
        match self {
            ComponentStatus::Installed => "Installed",
            ComponentStatus::InStorage => "In Storage",
            ComponentStatus::Other(s) => s,
        }
    }

    /// Returns true for [`ComponentStatus::Installed`].
    pub fn is_installed(&self) -> bool {
        matches!(self, ComponentStatus::Installed)
    }
}

impl Default for ComponentStatus {
    fn default() -> Self {
        ComponentStatus::Other(String::new())
    }
}

impl From<Option<String>> for ComponentStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("Installed") => ComponentStatus::Installed,
            Some("In Storage") => ComponentStatus::InStorage,
            Some(other) => ComponentStatus::Other(other.to_string()),
            None => ComponentStatus::default(),
        }
    }
}

impl From<ComponentStatus> for String {
    fn from(status: ComponentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Inventory Record
// =============================================================================

/// One tracked component as listed by `GET /components`.
///
/// Text fields the server omits or sends as `null` read as empty strings, so
/// filtering and sorting never have to special-case absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Unique identifier encoded in the component's QR label.
    #[serde(rename = "component_id", default, deserialize_with = "null_as_empty")]
    pub id: String,

    /// Component kind (e.g., "Rail Clip", "Liner").
    #[serde(default, deserialize_with = "null_as_empty")]
    pub component_type: String,

    /// Supplier name.
    #[serde(rename = "vendor_name", default, deserialize_with = "null_as_empty")]
    pub vendor: String,

    /// Manufacturing batch number.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub batch_no: String,

    /// Lifecycle status.
    #[serde(default)]
    pub status: ComponentStatus,

    /// Fields not interpreted by the core.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl InventoryRecord {
    /// Creates a record with the three searchable fields set.
    pub fn new(
        id: impl Into<String>,
        component_type: impl Into<String>,
        vendor: impl Into<String>,
    ) -> Self {
        InventoryRecord {
            id: id.into(),
            component_type: component_type.into(),
            vendor: vendor.into(),
            batch_no: String::new(),
            status: ComponentStatus::default(),
            extra: serde_json::Map::new(),
        }
    }

    /// Sets the batch number.
    pub fn with_batch_no(mut self, batch_no: impl Into<String>) -> Self {
        self.batch_no = batch_no.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: ComponentStatus) -> Self {
        self.status = status;
        self
    }

    /// Looks up a pass-through field as text, if present and a string.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Raw registration form, exactly as the UI collects it.
///
/// Every field is text; [`crate::validation::validate_component_form`] turns
/// it into a [`NewComponent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentForm {
    pub component_type: String,
    pub material: String,
    pub vendor_name: String,
    pub batch_no: String,
    /// `YYYY-MM-DD`
    pub manufacturing_date: String,
    pub warranty_years: String,
    /// `YYYY-MM-DD`, empty when the component is still in storage.
    pub installation_date: String,
    pub track_section_id: String,
    pub location_lat: String,
    pub location_lon: String,
}

impl Default for ComponentForm {
    fn default() -> Self {
        ComponentForm {
            component_type: String::new(),
            material: String::new(),
            vendor_name: String::new(),
            batch_no: String::new(),
            manufacturing_date: String::new(),
            warranty_years: crate::DEFAULT_WARRANTY_YEARS.to_string(),
            installation_date: String::new(),
            track_section_id: String::new(),
            location_lat: String::new(),
            location_lon: String::new(),
        }
    }
}

/// Validated registration payload sent to `POST /components/add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComponent {
    pub component_type: String,
    pub material: String,
    pub vendor_name: String,
    pub batch_no: String,
    pub manufacturing_date: NaiveDate,
    pub warranty_years: u32,
    pub installation_date: Option<NaiveDate>,
    pub track_section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lon: Option<f64>,
}

/// Response to a successful registration.
///
/// The server mints the identifier and renders its code label as SVG (for
/// printing) and DXF (for laser marking).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedComponent {
    #[serde(default)]
    pub message: String,
    pub component: InventoryRecord,
    pub svg_content: String,
    pub dxf_content: String,
}

/// A downloadable label file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFile<'a> {
    pub file_name: String,
    pub content: &'a str,
}

impl CreatedComponent {
    /// Identifier assigned by the server.
    pub fn component_id(&self) -> &str {
        &self.component.id
    }

    /// The two label files, named `qr_<id>.svg` and `qr_<id>.dxf`.
    pub fn label_files(&self) -> [LabelFile<'_>; 2] {
        [
            LabelFile {
                file_name: format!("qr_{}.svg", self.component.id),
                content: &self.svg_content,
            },
            LabelFile {
                file_name: format!("qr_{}.dxf", self.component.id),
                content: &self.dxf_content,
            },
        ]
    }
}

// =============================================================================
// Report
// =============================================================================

/// Maintenance report generated upstream for a single component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentReport {
    /// Markdown body.
    pub report_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_from_wire_strings() {
        let installed: ComponentStatus = serde_json::from_value(json!("Installed")).unwrap();
        let storage: ComponentStatus = serde_json::from_value(json!("In Storage")).unwrap();
        let other: ComponentStatus = serde_json::from_value(json!("Scrapped")).unwrap();
        let null: ComponentStatus = serde_json::from_value(json!(null)).unwrap();

        assert_eq!(installed, ComponentStatus::Installed);
        assert_eq!(storage, ComponentStatus::InStorage);
        assert_eq!(other, ComponentStatus::Other("Scrapped".to_string()));
        assert_eq!(null.as_str(), "");
    }

    #[test]
    fn test_record_reads_missing_and_null_fields_as_empty() {
        let record: InventoryRecord = serde_json::from_value(json!({
            "component_id": "aB3dE9xZ",
            "component_type": null,
            "status": "Installed"
        }))
        .unwrap();

        assert_eq!(record.id, "aB3dE9xZ");
        assert_eq!(record.component_type, "");
        assert_eq!(record.vendor, "");
        assert_eq!(record.batch_no, "");
        assert!(record.status.is_installed());
    }

    #[test]
    fn test_record_keeps_pass_through_fields() {
        let record: InventoryRecord = serde_json::from_value(json!({
            "component_id": "K9",
            "component_type": "Liner",
            "vendor_name": "Acme",
            "batch_no": "B-12",
            "status": "In Storage",
            "material": "Nylon 66",
            "track_section_id": "MUM-SUR-UP-KM254"
        }))
        .unwrap();

        assert_eq!(record.extra_str("material"), Some("Nylon 66"));
        assert_eq!(record.extra.len(), 2);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["vendor_name"], "Acme");
        assert_eq!(back["status"], "In Storage");
        assert_eq!(back["track_section_id"], "MUM-SUR-UP-KM254");
    }

    #[test]
    fn test_new_component_wire_format() {
        let payload = NewComponent {
            component_type: "Rail Clip".into(),
            material: "Steel".into(),
            vendor_name: "Acme".into(),
            batch_no: "B-1".into(),
            manufacturing_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            warranty_years: 10,
            installation_date: None,
            track_section_id: None,
            location_lat: None,
            location_lon: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["manufacturing_date"], "2024-03-01");
        assert!(value["installation_date"].is_null());
        assert!(value.get("location_lat").is_none());
    }

    #[test]
    fn test_label_files() {
        let created: CreatedComponent = serde_json::from_value(json!({
            "message": "Component created successfully",
            "component": { "component_id": "Zq81LmNo", "component_type": "Liner" },
            "svg_content": "<svg/>",
            "dxf_content": "0\nEOF"
        }))
        .unwrap();

        assert_eq!(created.component_id(), "Zq81LmNo");
        let [svg, dxf] = created.label_files();
        assert_eq!(svg.file_name, "qr_Zq81LmNo.svg");
        assert_eq!(svg.content, "<svg/>");
        assert_eq!(dxf.file_name, "qr_Zq81LmNo.dxf");
    }
}
