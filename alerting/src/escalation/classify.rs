//! Urgency classification.
//!
//! The rule is exact and reproducible; no heuristics. Anything declared with
//! an urgent type or critical priority gets the full alarm treatment.

use serde::{Deserialize, Serialize};

use crate::message::InboundMessage;

/// Message types that always escalate to a full alarm episode.
pub const URGENT_TYPES: [&str; 3] = ["emergency", "new_case", "case_assigned"];

/// Priority value that escalates regardless of type.
pub const CRITICAL_PRIORITY: &str = "critical";

/// How urgently an inbound message must be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Full alarm episode, blocking alert surface, non-dismissible
    /// notification with an acknowledgment action.
    Emergency,
    /// High-importance passive notification with a distinct vibration
    /// pattern; no alarm.
    CaseUpdate,
    /// Default passive notification.
    General,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emergency => write!(f, "emergency"),
            Self::CaseUpdate => write!(f, "case_update"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Classify an inbound message.
///
/// `Emergency` when the declared type is urgent or the priority is critical;
/// `CaseUpdate` when the type is "case"; `General` otherwise.
pub fn classify(message: &InboundMessage) -> Urgency {
    let kind = message.kind.as_deref().unwrap_or("");
    if URGENT_TYPES.contains(&kind) || message.priority.as_deref() == Some(CRITICAL_PRIORITY) {
        Urgency::Emergency
    } else if kind == "case" {
        Urgency::CaseUpdate
    } else {
        Urgency::General
    }
}
