//! Inbound push message model.
//!
//! Push payloads arrive as loose string maps; every field is optional. The
//! pipeline never rejects a message for missing display data — absent fields
//! render as a placeholder on the alert surface.

use serde::{Deserialize, Serialize};

/// Placeholder shown for display fields the payload did not carry.
pub const MISSING_FIELD_PLACEHOLDER: &str = "-";

/// Opaque reference to the case that triggered a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseRef(pub String);

impl CaseRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CaseRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An inbound push message, as delivered by the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundMessage {
    /// Declared message type (e.g. "emergency", "new_case", "case").
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Declared priority (e.g. "critical", "normal").
    pub priority: Option<String>,
    pub case_id: Option<String>,
    pub case_number: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_complaint: Option<String>,
    pub address: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl InboundMessage {
    /// The case reference, if the payload carried one.
    pub fn case_ref(&self) -> Option<CaseRef> {
        self.case_id.as_deref().map(CaseRef::new)
    }

    /// Notification title, with the default used when the payload omits it.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Dispatch notification")
    }

    /// Notification body, with the default used when the payload omits it.
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or("You have a new notification")
    }

    /// Display fields for the alert surface, placeholder-filled.
    pub fn case_details(&self) -> CaseDetails {
        CaseDetails {
            case_number: placeholder(&self.case_number),
            patient_name: placeholder(&self.patient_name),
            patient_phone: placeholder(&self.patient_phone),
            patient_complaint: placeholder(&self.patient_complaint),
            address: placeholder(&self.address),
        }
    }
}

fn placeholder(field: &Option<String>) -> String {
    match field.as_deref() {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => MISSING_FIELD_PLACEHOLDER.to_string(),
    }
}

/// Display fields bound to an alert presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDetails {
    pub case_number: String,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_complaint: String,
    pub address: String,
}

impl Default for CaseDetails {
    fn default() -> Self {
        InboundMessage::default().case_details()
    }
}
