//! Alarm lifecycle controller.
//!
//! Owns the single in-flight alarm episode. All transitions go through one
//! `tokio::sync::Mutex`, so starts and stops are serialized no matter which
//! execution context they arrive from (message handler, timeout task, surface
//! action, notification action). Stop is cooperative and idempotent: the
//! first trigger for the current episode does the teardown, every other
//! trigger — concurrent, repeated, or stale — observes a no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{
    is_legal_transition, AlarmEpisode, EpisodeId, EpisodeState, StopTrigger, TransitionRecord,
};
use crate::config::AlertingConfig;
use crate::events::{AlertEvent, SharedEventBus};
use crate::message::CaseRef;
use crate::platform::PlatformHandles;
use crate::resilience::DegradationLevel;
use crate::resources::{ResourceGuard, ResourceSet};
use crate::siren::{generate_cycle, generate_tone_pulse, spawn_render_loop};

/// One live episode and everything needed to tear it down.
struct ActiveEpisode {
    episode: AlarmEpisode,
    resources: Arc<ResourceSet>,
    /// Cancels both the render loop and the pending timeout task.
    cancel: CancellationToken,
    render: Option<tokio::task::JoinHandle<()>>,
}

struct ControllerInner {
    /// The single "current episode" slot. `None` is `Idle`.
    slot: Mutex<Option<ActiveEpisode>>,
    seq: AtomicU64,
    guard: ResourceGuard,
    config: AlertingConfig,
    events: SharedEventBus,
    transitions: std::sync::Mutex<Vec<TransitionRecord>>,
}

/// The alarm lifecycle controller. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AlarmController {
    inner: Arc<ControllerInner>,
}

impl AlarmController {
    pub fn new(platform: PlatformHandles, config: AlertingConfig, events: SharedEventBus) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                slot: Mutex::new(None),
                seq: AtomicU64::new(0),
                guard: ResourceGuard::new(platform),
                config,
                events,
                transitions: std::sync::Mutex::new(Vec::new()),
            }),
        }
    }

    /// Start a new episode for a case.
    ///
    /// If an episode is already ringing it is fully retired first — stopped
    /// and released — before any resource of the new episode is acquired.
    pub async fn start(&self, case: Option<CaseRef>) -> EpisodeId {
        let mut slot = self.inner.slot.lock().await;

        if let Some(active) = slot.take() {
            info!(old = %active.episode.id, "superseding ringing episode");
            self.teardown(active, StopTrigger::Superseded).await;
        }

        let id = EpisodeId(self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1);
        self.record_transition(id, EpisodeState::Idle, EpisodeState::Ringing, None);

        let resources = Arc::new(self.inner.guard.acquire(
            id,
            &self.inner.config.siren,
            self.inner.config.alarm.wake_bound(),
        ));
        let cancel = CancellationToken::new();

        let render = resources.sink().map(|sink| {
            let buffer = match resources.audio_level() {
                DegradationLevel::Partial => generate_tone_pulse(self.inner.config.siren.sample_rate),
                _ => generate_cycle(&self.inner.config.siren),
            };
            spawn_render_loop(sink, buffer, cancel.clone())
        });

        let episode = AlarmEpisode {
            id,
            case: case.clone(),
            started_at: Utc::now(),
            max_duration: self.inner.config.alarm.max_duration(),
            audio: resources.audio_level(),
        };

        self.arm_timeout(id, cancel.clone());

        self.inner.events.publish(AlertEvent::EpisodeStarted {
            episode: id,
            case,
            audio: resources.audio_level(),
            timestamp: Utc::now(),
        });
        info!(episode = %id, audio = %resources.audio_level(), "alarm episode ringing");

        *slot = Some(ActiveEpisode {
            episode,
            resources,
            cancel,
            render,
        });
        id
    }

    /// Stop an episode.
    ///
    /// Returns true if this call performed the teardown. A stale id, an
    /// already-stopped episode, or a lost stop race all return false without
    /// side effects.
    pub async fn stop(&self, episode: EpisodeId, trigger: StopTrigger) -> bool {
        let mut slot = self.inner.slot.lock().await;

        let matches = slot.as_ref().is_some_and(|active| active.episode.id == episode);
        if !matches {
            debug!(episode = %episode, %trigger, "stale or repeated stop trigger, no-op");
            return false;
        }

        let active = slot.take().expect("slot checked non-empty under lock");
        self.teardown(active, trigger).await;
        true
    }

    /// Stop whatever episode is ringing, if any. Used on host shutdown.
    pub async fn shutdown(&self) {
        let current = self.current().await;
        if let Some(episode) = current {
            self.stop(episode.id, StopTrigger::Shutdown).await;
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> EpisodeState {
        if self.inner.slot.lock().await.is_some() {
            EpisodeState::Ringing
        } else {
            EpisodeState::Idle
        }
    }

    /// Snapshot of the ringing episode, if any.
    pub async fn current(&self) -> Option<AlarmEpisode> {
        self.inner.slot.lock().await.as_ref().map(|a| a.episode.clone())
    }

    /// Full transition log, oldest first.
    pub fn transitions(&self) -> Vec<TransitionRecord> {
        self.inner.transitions.lock().expect("transition lock poisoned").clone()
    }

    /// Tear down a taken-out episode: cancel, join the render loop (bounded),
    /// release resources, record and publish the transitions.
    ///
    /// The caller holds the slot lock, which is what makes supersession and
    /// concurrent stops serialize.
    async fn teardown(&self, active: ActiveEpisode, trigger: StopTrigger) {
        let id = active.episode.id;
        self.record_transition(id, EpisodeState::Ringing, EpisodeState::Stopped, Some(trigger));

        // Cooperative stop: the token cancels the render loop and the pending
        // timeout; the bounded join keeps the sink alive until the loop has
        // observed cancellation, so no write can race the device release.
        active.cancel.cancel();
        if let Some(render) = active.render {
            let join_timeout = self.inner.config.alarm.render_join_timeout();
            if tokio::time::timeout(join_timeout, render).await.is_err() {
                warn!(episode = %id, "render loop did not exit within join timeout");
            }
        }

        let report = self.inner.guard.release(&active.resources);
        if !report.failures.is_empty() {
            warn!(
                episode = %id,
                failures = report.failures.len(),
                "episode released with partial failures"
            );
        }

        self.record_transition(id, EpisodeState::Stopped, EpisodeState::Idle, None);
        self.inner.events.publish(AlertEvent::EpisodeStopped {
            episode: id,
            trigger,
            release_failures: report.failures.len(),
            timestamp: Utc::now(),
        });
        info!(episode = %id, %trigger, "alarm episode stopped");
    }

    /// Arm the deferred stop at `now + max_duration`.
    ///
    /// The token cancels a pending timeout; a timeout that already fired for
    /// a no-longer-current episode dies on the id check inside `stop`.
    fn arm_timeout(&self, id: EpisodeId, cancel: CancellationToken) {
        let controller = self.clone();
        let max_duration = self.inner.config.alarm.max_duration();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(max_duration) => {
                    debug!(episode = %id, "max duration elapsed, stopping");
                    controller.stop(id, StopTrigger::Timeout).await;
                }
            }
        });
    }

    fn record_transition(
        &self,
        episode: EpisodeId,
        from: EpisodeState,
        to: EpisodeState,
        trigger: Option<StopTrigger>,
    ) {
        debug_assert!(is_legal_transition(from, to), "illegal transition {from} -> {to}");
        debug!(episode = %episode, %from, %to, "lifecycle transition");
        self.inner
            .transitions
            .lock()
            .expect("transition lock poisoned")
            .push(TransitionRecord {
                episode,
                from,
                to,
                trigger,
                at: Utc::now(),
            });
    }
}
