//! Alert surface arbiter.
//!
//! At most one blocking full-screen presentation is active at a time. A new
//! emergency retires the previous presentation before activating its own, so
//! the operator always sees the most recent case — never a stale one layered
//! behind. The surface owns no alarm resources: every user action first
//! routes through the lifecycle controller's stop path for the episode the
//! presentation is bound to.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::{AlertEvent, SharedEventBus};
use crate::lifecycle::{AlarmController, EpisodeId, StopTrigger};
use crate::message::{CaseDetails, CaseRef};
use crate::navigation::{NavigationRequest, Navigator};

/// Explicit operator actions on the alert surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceAction {
    Acknowledge,
    GoToCase,
    ReportExcuse,
    /// Tap outside the action buttons: stops the alarm, keeps the surface.
    Silence,
}

/// Handle identifying one presentation instance. Actions carrying a handle
/// that is no longer current are silent no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PresentationHandle {
    id: Uuid,
}

impl PresentationHandle {
    fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn id(&self) -> String {
        self.id.to_string()
    }
}

/// What the surface does with a platform back-navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackDisposition {
    /// A presentation is active: back is swallowed, the operator must pick
    /// an explicit action.
    Blocked,
    /// No active presentation; the host handles back as usual.
    NotHandled,
}

struct ActivePresentation {
    handle: PresentationHandle,
    episode: EpisodeId,
    case: Option<CaseRef>,
    details: CaseDetails,
}

/// The surface arbiter. One instance per process.
pub struct SurfaceArbiter {
    slot: Mutex<Option<ActivePresentation>>,
    controller: AlarmController,
    navigator: Arc<dyn Navigator>,
    events: SharedEventBus,
}

impl SurfaceArbiter {
    pub fn new(
        controller: AlarmController,
        navigator: Arc<dyn Navigator>,
        events: SharedEventBus,
    ) -> Self {
        Self {
            slot: Mutex::new(None),
            controller,
            navigator,
            events,
        }
    }

    /// Activate a presentation for an episode, retiring any active one first.
    pub async fn present(
        &self,
        episode: EpisodeId,
        case: Option<CaseRef>,
        details: CaseDetails,
    ) -> PresentationHandle {
        let mut slot = self.slot.lock().await;
        let handle = PresentationHandle::new();

        if let Some(old) = slot.take() {
            info!(retired = %old.handle.id(), by = %handle.id(), "replacing active presentation");
            self.events.publish(AlertEvent::PresentationReplaced {
                retired: old.handle.id(),
                replaced_by: handle.id(),
                timestamp: Utc::now(),
            });
        }

        self.events.publish(AlertEvent::PresentationShown {
            presentation: handle.id(),
            episode,
            case: case.clone(),
            timestamp: Utc::now(),
        });
        info!(presentation = %handle.id(), episode = %episode, "alert surface presented");

        *slot = Some(ActivePresentation {
            handle: handle.clone(),
            episode,
            case,
            details,
        });
        handle
    }

    /// The active presentation's handle and bound episode, if any.
    pub async fn current(&self) -> Option<(PresentationHandle, EpisodeId)> {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(|p| (p.handle.clone(), p.episode))
    }

    /// Display fields of the active presentation, if any.
    pub async fn current_details(&self) -> Option<CaseDetails> {
        self.slot.lock().await.as_ref().map(|p| p.details.clone())
    }

    /// Platform back navigation: blocked while a presentation is active.
    pub async fn on_back(&self) -> BackDisposition {
        if self.slot.lock().await.is_some() {
            BackDisposition::Blocked
        } else {
            BackDisposition::NotHandled
        }
    }

    /// Operator acknowledged the case without opening it.
    pub async fn acknowledge(&self, handle: &PresentationHandle) -> bool {
        self.close_with_action(handle, SurfaceAction::Acknowledge, StopTrigger::Acknowledged)
            .await
            .is_some()
    }

    /// Operator opens the case: stop the alarm, emit navigation, close.
    ///
    /// Returns the navigation request when the presentation carried a case
    /// reference.
    pub async fn go_to_case(&self, handle: &PresentationHandle) -> Option<NavigationRequest> {
        let closed = self
            .close_with_action(handle, SurfaceAction::GoToCase, StopTrigger::GoToCase)
            .await?;

        let case = closed.case?;
        let request = NavigationRequest::to_case(case.clone());
        if let Err(error) = self.navigator.navigate(request.clone()).await {
            warn!(case = %case, %error, "navigation request failed");
        }
        self.events.publish(AlertEvent::NavigationRequested {
            case,
            target: request.target.clone(),
            timestamp: Utc::now(),
        });
        Some(request)
    }

    /// Operator reported an excuse instead of taking the case.
    pub async fn report_excuse(&self, handle: &PresentationHandle) -> bool {
        self.close_with_action(handle, SurfaceAction::ReportExcuse, StopTrigger::Excuse)
            .await
            .is_some()
    }

    /// Tap outside the action buttons: silence the alarm, keep the surface up
    /// so the operator must still pick an explicit action.
    pub async fn silence(&self, handle: &PresentationHandle) -> bool {
        let slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(active) if active.handle == *handle => {
                let episode = active.episode;
                self.controller.stop(episode, StopTrigger::Silenced).await;
                info!(presentation = %handle.id(), episode = %episode, "alarm silenced, surface stays");
                true
            }
            _ => {
                debug!(presentation = %handle.id(), "silence on stale presentation, no-op");
                false
            }
        }
    }

    /// Tear down the presentation if it is still current, without touching
    /// the alarm episode. Stale handles are a no-op.
    pub async fn retire_if_current(&self, handle: &PresentationHandle) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(active) if active.handle == *handle => {
                let old = slot.take().expect("slot checked non-empty under lock");
                self.events.publish(AlertEvent::PresentationClosed {
                    presentation: old.handle.id(),
                    action: None,
                    timestamp: Utc::now(),
                });
                debug!(presentation = %handle.id(), "presentation retired");
                true
            }
            _ => false,
        }
    }

    /// Shared action path: verify the handle is current, stop the episode's
    /// alarm first, then destroy the presentation and publish the action.
    async fn close_with_action(
        &self,
        handle: &PresentationHandle,
        action: SurfaceAction,
        trigger: StopTrigger,
    ) -> Option<ActivePresentation> {
        let mut slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(active) if active.handle == *handle => {
                let active = slot.take().expect("slot checked non-empty under lock");
                // Stop path runs before the action's own effect.
                self.controller.stop(active.episode, trigger).await;
                self.events.publish(AlertEvent::PresentationClosed {
                    presentation: active.handle.id(),
                    action: Some(action),
                    timestamp: Utc::now(),
                });
                info!(presentation = %handle.id(), ?action, "presentation closed by operator");
                Some(active)
            }
            _ => {
                debug!(presentation = %handle.id(), ?action, "action on stale presentation, no-op");
                None
            }
        }
    }
}
