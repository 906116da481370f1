//! Message routing.
//!
//! Takes a classified inbound message and drives the matching escalation:
//! a full alarm episode with a blocking surface for emergencies, a passive
//! notification for everything else. Routing never blocks on rendering —
//! the siren loop runs on its own task; only bounded resource acquisition
//! happens on this path.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::classify::{classify, Urgency};
use crate::config::VibrationPattern;
use crate::events::{AlertEvent, SharedEventBus};
use crate::lifecycle::{AlarmController, EpisodeId, StopTrigger};
use crate::message::InboundMessage;
use crate::navigation::NavigationRequest;
use crate::notify::{
    channel_specs, ChannelSpec, NotificationAction, NotificationClass, NotificationId,
    NotificationRequest, Notifier,
};
use crate::surface::{PresentationHandle, SurfaceArbiter};

/// What routing one message produced.
#[derive(Debug)]
pub struct RoutedOutcome {
    pub urgency: Urgency,
    /// The alarm episode started for the message, when it escalated.
    pub episode: Option<EpisodeId>,
    /// The presentation activated for the message, when it escalated.
    pub presentation: Option<PresentationHandle>,
    /// The notification posted, unless the shell failed to post one.
    pub notification: Option<NotificationId>,
}

/// Routes inbound messages to episodes, surfaces, and notifications.
pub struct EscalationRouter {
    controller: AlarmController,
    surface: Arc<SurfaceArbiter>,
    notifier: Arc<dyn Notifier>,
    events: SharedEventBus,
}

impl EscalationRouter {
    pub fn new(
        controller: AlarmController,
        surface: Arc<SurfaceArbiter>,
        notifier: Arc<dyn Notifier>,
        events: SharedEventBus,
    ) -> Self {
        Self {
            controller,
            surface,
            notifier,
            events,
        }
    }

    /// The notification channels the platform shell installs at startup.
    pub fn channel_specs(&self) -> Vec<ChannelSpec> {
        channel_specs()
    }

    /// Classify a message and run its escalation.
    pub async fn route(&self, message: &InboundMessage) -> RoutedOutcome {
        let urgency = classify(message);
        let case = message.case_ref();
        self.events.publish(AlertEvent::MessageClassified {
            urgency,
            case: case.clone(),
            timestamp: Utc::now(),
        });
        info!(%urgency, case = ?case, "inbound message classified");

        match urgency {
            Urgency::Emergency => self.route_emergency(message).await,
            Urgency::CaseUpdate => {
                let notification = self
                    .post(NotificationRequest {
                        class: NotificationClass::Case,
                        title: message.title().to_string(),
                        body: message.body().to_string(),
                        ongoing: false,
                        vibration: Some(VibrationPattern::case_update()),
                        actions: Vec::new(),
                        tap_navigation: case.map(NavigationRequest::to_case),
                    })
                    .await;
                RoutedOutcome {
                    urgency,
                    episode: None,
                    presentation: None,
                    notification,
                }
            }
            Urgency::General => {
                let notification = self
                    .post(NotificationRequest {
                        class: NotificationClass::General,
                        title: message.title().to_string(),
                        body: message.body().to_string(),
                        ongoing: false,
                        vibration: None,
                        actions: Vec::new(),
                        tap_navigation: None,
                    })
                    .await;
                RoutedOutcome {
                    urgency,
                    episode: None,
                    presentation: None,
                    notification,
                }
            }
        }
    }

    /// Operator hit the acknowledgment action on the emergency notification:
    /// stop the bound episode's alarm and take the notification down.
    ///
    /// A stale episode id means the alarm already stopped; the notification
    /// is still cancelled.
    pub async fn acknowledge_notification(
        &self,
        episode: EpisodeId,
        notification: NotificationId,
    ) -> bool {
        let stopped = self.controller.stop(episode, StopTrigger::Acknowledged).await;
        if let Err(error) = self.notifier.cancel(notification).await {
            warn!(%notification, %error, "failed to cancel acknowledged notification");
        }
        stopped
    }

    /// Full emergency bundle: alarm episode, blocking surface, ongoing
    /// notification with an acknowledgment action.
    ///
    /// Supersession of a running episode and of an active presentation both
    /// happen inside the respective components.
    async fn route_emergency(&self, message: &InboundMessage) -> RoutedOutcome {
        let case = message.case_ref();
        let episode = self.controller.start(case.clone()).await;
        let presentation = self
            .surface
            .present(episode, case.clone(), message.case_details())
            .await;

        let notification = self
            .post(NotificationRequest {
                class: NotificationClass::Emergency,
                title: message.title().to_string(),
                body: message.body().to_string(),
                ongoing: true,
                vibration: Some(VibrationPattern::emergency()),
                actions: vec![NotificationAction::Acknowledge { episode }],
                tap_navigation: case.map(NavigationRequest::to_case),
            })
            .await;

        RoutedOutcome {
            urgency: Urgency::Emergency,
            episode: Some(episode),
            presentation: Some(presentation),
            notification,
        }
    }

    /// Post a notification, best-effort. A shell failure degrades the
    /// outcome, it never fails the route.
    async fn post(&self, request: NotificationRequest) -> Option<NotificationId> {
        let class = request.class;
        let ongoing = request.ongoing;
        match self.notifier.notify(request).await {
            Ok(id) => {
                self.events.publish(AlertEvent::NotificationRequested {
                    id,
                    class,
                    ongoing,
                    timestamp: Utc::now(),
                });
                Some(id)
            }
            Err(error) => {
                warn!(?class, %error, "notification request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    use crate::config::AlertingConfig;
    use crate::events::EventBus;
    use crate::lifecycle::EpisodeState;
    use crate::message::CaseRef;
    use crate::navigation::Navigator;
    use crate::platform::sim::SimPlatform;
    use crate::platform::{PlatformError, PlatformResult};

    struct RecordingNotifier {
        seq: AtomicU64,
        fail: AtomicBool,
        posted: Mutex<Vec<NotificationRequest>>,
        cancelled: Mutex<Vec<NotificationId>>,
    }

    impl RecordingNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seq: AtomicU64::new(0),
                fail: AtomicBool::new(false),
                posted: Mutex::new(Vec::new()),
                cancelled: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, request: NotificationRequest) -> PlatformResult<NotificationId> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PlatformError::Unavailable("shell down".into()));
            }
            self.posted.lock().unwrap().push(request);
            Ok(NotificationId(self.seq.fetch_add(1, Ordering::SeqCst) + 1))
        }

        async fn cancel(&self, id: NotificationId) -> PlatformResult<()> {
            self.cancelled.lock().unwrap().push(id);
            Ok(())
        }
    }

    struct NullNavigator;

    #[async_trait::async_trait]
    impl Navigator for NullNavigator {
        async fn navigate(&self, _request: NavigationRequest) -> PlatformResult<()> {
            Ok(())
        }
    }

    fn fixture() -> (EscalationRouter, AlarmController, Arc<RecordingNotifier>) {
        let platform = SimPlatform::new();
        let events = EventBus::new().shared();
        let controller =
            AlarmController::new(platform.handles(), AlertingConfig::default(), events.clone());
        let surface = Arc::new(SurfaceArbiter::new(
            controller.clone(),
            Arc::new(NullNavigator),
            events.clone(),
        ));
        let notifier = RecordingNotifier::new();
        let router = EscalationRouter::new(
            controller.clone(),
            surface,
            notifier.clone(),
            events,
        );
        (router, controller, notifier)
    }

    fn emergency_message(case: &str) -> InboundMessage {
        InboundMessage {
            kind: Some("new_case".into()),
            priority: Some("critical".into()),
            case_id: Some(case.into()),
            ..Default::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_emergency_route_starts_full_bundle() {
        let (router, controller, notifier) = fixture();

        let outcome = router.route(&emergency_message("c1")).await;
        assert_eq!(outcome.urgency, Urgency::Emergency);
        let episode = outcome.episode.expect("episode started");
        assert!(outcome.presentation.is_some());
        assert!(outcome.notification.is_some());

        assert_eq!(controller.state().await, EpisodeState::Ringing);
        assert_eq!(controller.current().await.unwrap().case, Some(CaseRef::new("c1")));

        let posted = notifier.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].class, NotificationClass::Emergency);
        assert!(posted[0].ongoing, "emergency notification must not be swipeable");
        assert_eq!(
            posted[0].actions,
            vec![NotificationAction::Acknowledge { episode }]
        );
        assert_eq!(
            posted[0].tap_navigation.as_ref().unwrap().target,
            "/dashboard/cases/c1"
        );
        drop(posted);

        controller.stop(episode, StopTrigger::Acknowledged).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_case_update_posts_passive_notification_only() {
        let (router, controller, notifier) = fixture();

        let message = InboundMessage {
            kind: Some("case".into()),
            case_id: Some("c3".into()),
            ..Default::default()
        };
        let outcome = router.route(&message).await;

        assert_eq!(outcome.urgency, Urgency::CaseUpdate);
        assert!(outcome.episode.is_none());
        assert!(outcome.presentation.is_none());
        assert_eq!(controller.state().await, EpisodeState::Idle);

        let posted = notifier.posted.lock().unwrap();
        assert_eq!(posted[0].class, NotificationClass::Case);
        assert!(!posted[0].ongoing);
        assert_eq!(posted[0].vibration, Some(VibrationPattern::case_update()));
        assert!(posted[0].actions.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_general_message_gets_default_notification() {
        let (router, controller, notifier) = fixture();

        let outcome = router.route(&InboundMessage::default()).await;
        assert_eq!(outcome.urgency, Urgency::General);
        assert!(outcome.episode.is_none());
        assert_eq!(controller.state().await, EpisodeState::Idle);

        let posted = notifier.posted.lock().unwrap();
        assert_eq!(posted[0].class, NotificationClass::General);
        assert!(posted[0].vibration.is_none());
        assert!(posted[0].tap_navigation.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_notification_acknowledge_stops_alarm_and_cancels() {
        let (router, controller, notifier) = fixture();

        let outcome = router.route(&emergency_message("c1")).await;
        let episode = outcome.episode.unwrap();
        let notification = outcome.notification.unwrap();

        assert!(router.acknowledge_notification(episode, notification).await);
        assert_eq!(controller.state().await, EpisodeState::Idle);
        assert_eq!(*notifier.cancelled.lock().unwrap(), vec![notification]);

        // A repeat is a stale trigger; the cancel is still attempted.
        assert!(!router.acknowledge_notification(episode, notification).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_notifier_failure_does_not_fail_the_episode() {
        let (router, controller, notifier) = fixture();
        notifier.fail.store(true, Ordering::SeqCst);

        let outcome = router.route(&emergency_message("c1")).await;
        assert!(outcome.notification.is_none());
        // The alarm and the surface still came up.
        let episode = outcome.episode.expect("episode started despite shell failure");
        assert!(outcome.presentation.is_some());
        assert_eq!(controller.state().await, EpisodeState::Ringing);

        controller.stop(episode, StopTrigger::Acknowledged).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_second_emergency_supersedes_first() {
        let (router, controller, _notifier) = fixture();

        let first = router.route(&emergency_message("c1")).await;
        let second = router.route(&emergency_message("c2")).await;

        let current = controller.current().await.unwrap();
        assert_eq!(Some(current.id), second.episode);
        assert_eq!(current.case, Some(CaseRef::new("c2")));
        assert_ne!(first.episode, second.episode);

        controller.stop(current.id, StopTrigger::Acknowledged).await;
    }

    #[test]
    fn test_channel_specs_exposed_for_shell() {
        let platform = SimPlatform::new();
        let events = EventBus::new().shared();
        let controller =
            AlarmController::new(platform.handles(), AlertingConfig::default(), events.clone());
        let surface = Arc::new(SurfaceArbiter::new(
            controller.clone(),
            Arc::new(NullNavigator),
            events.clone(),
        ));
        let router = EscalationRouter::new(controller, surface, RecordingNotifier::new(), events);
        assert_eq!(router.channel_specs().len(), 3);
    }
}
