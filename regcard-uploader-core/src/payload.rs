//! Wire models for the `dynamic-forms` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Document type marker sent with both the PDF upload and the mapping upload.
pub const REGISTRATION_CARD: &str = "REGISTRATION_CARD";
pub const PDF_ACRO_FORM: &str = "pdf_acro_form";

/// Body of the mapping `PUT`. The endpoint treats it as a full replace, so the
/// optional server-side fields are always sent as explicit `null`s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicFormPayload {
    pub form_type: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub property_id: String,
    pub file_name: String,
    pub active: bool,
    pub parameter_mappings: Vec<Value>,
    pub id: Uuid,
    pub form_id: Option<Value>,
    pub attachment_custom_report_configurations: Option<Value>,
    pub data_sources: Option<Value>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub deleted_at: Option<String>,
}

impl DynamicFormPayload {
    /// Build a registration card form with a newly generated `id`.
    pub fn registration_card(property_id: &str, file_name: &str, mappings: &[Value]) -> Self {
        Self {
            form_type: PDF_ACRO_FORM.to_string(),
            kind: REGISTRATION_CARD.to_string(),
            name: REGISTRATION_CARD.to_string(),
            property_id: property_id.to_string(),
            file_name: file_name.to_string(),
            active: true,
            parameter_mappings: mappings.to_vec(),
            id: Uuid::new_v4(),
            form_id: None,
            attachment_custom_report_configurations: None,
            data_sources: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }
}

/// Response of the PDF upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedDocument {
    pub filename: String,
}
