//! Event types for the alert lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::escalation::Urgency;
use crate::lifecycle::{EpisodeId, StopTrigger};
use crate::message::CaseRef;
use crate::notify::{NotificationClass, NotificationId};
use crate::resilience::DegradationLevel;
use crate::surface::SurfaceAction;

/// All alert lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertEvent {
    /// An inbound message was classified.
    MessageClassified {
        urgency: Urgency,
        case: Option<CaseRef>,
        timestamp: DateTime<Utc>,
    },

    /// An alarm episode acquired its resources and began ringing.
    EpisodeStarted {
        episode: EpisodeId,
        case: Option<CaseRef>,
        audio: DegradationLevel,
        timestamp: DateTime<Utc>,
    },

    /// An alarm episode stopped and its resources were released.
    EpisodeStopped {
        episode: EpisodeId,
        trigger: StopTrigger,
        release_failures: usize,
        timestamp: DateTime<Utc>,
    },

    /// A full-screen presentation became active.
    PresentationShown {
        presentation: String,
        episode: EpisodeId,
        case: Option<CaseRef>,
        timestamp: DateTime<Utc>,
    },

    /// An active presentation was retired in favor of a newer case.
    PresentationReplaced {
        retired: String,
        replaced_by: String,
        timestamp: DateTime<Utc>,
    },

    /// The operator closed a presentation with an explicit action, or it was
    /// retired externally (`action: None`).
    PresentationClosed {
        presentation: String,
        action: Option<SurfaceAction>,
        timestamp: DateTime<Utc>,
    },

    /// A notification was requested from the platform shell.
    NotificationRequested {
        id: NotificationId,
        class: NotificationClass,
        ongoing: bool,
        timestamp: DateTime<Utc>,
    },

    /// Post-acknowledgment navigation was requested.
    NavigationRequested {
        case: CaseRef,
        target: String,
        timestamp: DateTime<Utc>,
    },
}

impl AlertEvent {
    /// Snake-case type name, for filtering and logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageClassified { .. } => "message_classified",
            Self::EpisodeStarted { .. } => "episode_started",
            Self::EpisodeStopped { .. } => "episode_stopped",
            Self::PresentationShown { .. } => "presentation_shown",
            Self::PresentationReplaced { .. } => "presentation_replaced",
            Self::PresentationClosed { .. } => "presentation_closed",
            Self::NotificationRequested { .. } => "notification_requested",
            Self::NavigationRequested { .. } => "navigation_requested",
        }
    }

    /// The event's timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MessageClassified { timestamp, .. }
            | Self::EpisodeStarted { timestamp, .. }
            | Self::EpisodeStopped { timestamp, .. }
            | Self::PresentationShown { timestamp, .. }
            | Self::PresentationReplaced { timestamp, .. }
            | Self::PresentationClosed { timestamp, .. }
            | Self::NotificationRequested { timestamp, .. }
            | Self::NavigationRequested { timestamp, .. } => *timestamp,
        }
    }

    /// The episode the event refers to, when it refers to one.
    pub fn episode(&self) -> Option<EpisodeId> {
        match self {
            Self::EpisodeStarted { episode, .. }
            | Self::EpisodeStopped { episode, .. }
            | Self::PresentationShown { episode, .. } => Some(*episode),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_and_accessors() {
        let event = AlertEvent::EpisodeStopped {
            episode: EpisodeId(4),
            trigger: StopTrigger::Timeout,
            release_failures: 0,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "episode_stopped");
        assert_eq!(event.episode(), Some(EpisodeId(4)));
    }

    #[test]
    fn test_serde_roundtrip() {
        let event = AlertEvent::EpisodeStarted {
            episode: EpisodeId(1),
            case: Some(CaseRef::new("c1")),
            audio: DegradationLevel::Partial,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"episode_started""#));
        let restored: AlertEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.episode(), Some(EpisodeId(1)));
    }
}
