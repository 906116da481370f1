//! Outbound notification contract.
//!
//! The core decides a notification's urgency class, action set, and whether
//! it may be swiped away; rendering belongs to the platform shell behind the
//! [`Notifier`] trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::VibrationPattern;
use crate::lifecycle::EpisodeId;
use crate::navigation::NavigationRequest;
use crate::platform::PlatformResult;

/// Opaque id of a posted notification, allocated by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ntf-{}", self.0)
    }
}

/// Channel-urgency class of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationClass {
    Emergency,
    Case,
    General,
}

impl NotificationClass {
    /// Stable channel identifier the shell registers with the platform.
    pub fn channel_id(self) -> &'static str {
        match self {
            Self::Emergency => "emergency_channel",
            Self::Case => "case_channel",
            Self::General => "general_channel",
        }
    }
}

/// Channel importance, mirroring platform notification-channel tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Max,
    High,
    Default,
}

/// Static description of a notification channel, installed by the shell at
/// startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub class: NotificationClass,
    pub name: String,
    pub importance: Importance,
    /// Whether the channel may sound through do-not-disturb.
    pub bypass_dnd: bool,
    /// Channel-default vibration pattern, if any.
    pub vibration: Option<VibrationPattern>,
    /// Whether the channel sound uses alarm-class audio attributes.
    pub alarm_sound: bool,
    /// Whether content is visible on the lock screen.
    pub lockscreen_public: bool,
}

/// The three channels the dispatch client uses.
pub fn channel_specs() -> Vec<ChannelSpec> {
    vec![
        ChannelSpec {
            class: NotificationClass::Emergency,
            name: "Emergency cases".into(),
            importance: Importance::Max,
            bypass_dnd: true,
            vibration: Some(VibrationPattern::emergency()),
            alarm_sound: true,
            lockscreen_public: true,
        },
        ChannelSpec {
            class: NotificationClass::Case,
            name: "Case updates".into(),
            importance: Importance::High,
            bypass_dnd: false,
            vibration: Some(VibrationPattern::case_update()),
            alarm_sound: false,
            lockscreen_public: false,
        },
        ChannelSpec {
            class: NotificationClass::General,
            name: "General".into(),
            importance: Importance::Default,
            bypass_dnd: false,
            vibration: None,
            alarm_sound: false,
            lockscreen_public: false,
        },
    ]
}

/// An acknowledgment-style action offered on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationAction {
    /// Stop the bound episode's alarm without opening the case.
    Acknowledge { episode: EpisodeId },
}

impl NotificationAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Acknowledge { .. } => "Acknowledge",
        }
    }
}

/// A request to post one notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub class: NotificationClass,
    pub title: String,
    pub body: String,
    /// True when the notification must not be swipe-dismissible.
    pub ongoing: bool,
    /// Per-notification vibration override.
    pub vibration: Option<VibrationPattern>,
    pub actions: Vec<NotificationAction>,
    /// Navigation performed when the operator taps the notification body.
    pub tap_navigation: Option<NavigationRequest>,
}

/// Platform shell seam for posting and cancelling notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, request: NotificationRequest) -> PlatformResult<NotificationId>;
    async fn cancel(&self, id: NotificationId) -> PlatformResult<()>;
}
