//! Resource guard — acquires and releases the device resources an alarm
//! episode needs.
//!
//! Acquisition is best-effort: a failed device degrades the episode (recorded
//! on the set), it never fails it. Release is idempotent and safe to call
//! concurrently from any number of stop triggers; the real work happens
//! exactly once and every later caller observes a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::{SirenParams, VibrationPattern};
use crate::lifecycle::EpisodeId;
use crate::platform::{AudioSink, PlatformHandles, StreamSpec, VolumeAudit};
use crate::resilience::DegradationLevel;

/// The resources held by one episode.
///
/// Empty (all `None`/false) only before acquisition and after release.
pub struct ResourceSet {
    episode: EpisodeId,
    sink: Option<Arc<dyn AudioSink>>,
    audio_level: DegradationLevel,
    vibrating: bool,
    wake_held: bool,
    volume_audit: Option<VolumeAudit>,
    acquired_at: DateTime<Utc>,
    released: AtomicBool,
}

impl ResourceSet {
    pub fn episode(&self) -> EpisodeId {
        self.episode
    }

    /// The open audio sink, if any tier of the audio path came up.
    pub fn sink(&self) -> Option<Arc<dyn AudioSink>> {
        self.sink.clone()
    }

    pub fn audio_level(&self) -> DegradationLevel {
        self.audio_level
    }

    pub fn is_vibrating(&self) -> bool {
        self.vibrating
    }

    pub fn holds_wake(&self) -> bool {
        self.wake_held
    }

    /// Audit of the output state found before the volume override, if the
    /// platform allowed the override.
    pub fn volume_audit(&self) -> Option<&VolumeAudit> {
        self.volume_audit.as_ref()
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSet")
            .field("episode", &self.episode)
            .field("audio_level", &self.audio_level)
            .field("vibrating", &self.vibrating)
            .field("wake_held", &self.wake_held)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Which resource a release failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Audio,
    Vibration,
    Wake,
}

/// A single best-effort release step that failed.
#[derive(Debug, Clone)]
pub struct ReleaseFailure {
    pub resource: ResourceKind,
    pub error: String,
}

/// Outcome of a release call.
#[derive(Debug, Clone, Default)]
pub struct ReleaseReport {
    /// True when a previous caller already released the set; nothing was done.
    pub already_released: bool,
    /// Steps that failed. Failures never abort the remaining steps.
    pub failures: Vec<ReleaseFailure>,
}

impl ReleaseReport {
    /// Whether this call actually performed teardown work.
    pub fn did_work(&self) -> bool {
        !self.already_released
    }
}

/// Acquires and releases the four device resources of an episode.
#[derive(Clone)]
pub struct ResourceGuard {
    platform: PlatformHandles,
}

impl ResourceGuard {
    pub fn new(platform: PlatformHandles) -> Self {
        Self { platform }
    }

    /// Acquire everything an episode needs, best-effort.
    ///
    /// Order follows the alarm bring-up path: volume override, vibration,
    /// wake assertion, audio sink (with tone fallback). Individual failures
    /// are logged and recorded, never propagated.
    pub fn acquire(
        &self,
        episode: EpisodeId,
        siren: &SirenParams,
        wake_bound: Duration,
    ) -> ResourceSet {
        let volume_audit = match self.platform.policy.force_max_volume() {
            Ok(audit) => {
                info!(episode = %episode, was_silenced = audit.was_silenced, "volume forced to max");
                Some(audit)
            }
            Err(error) => {
                warn!(episode = %episode, %error, "volume override denied, continuing without it");
                None
            }
        };

        let vibrating = match self.platform.haptics.start_waveform(&VibrationPattern::emergency()) {
            Ok(()) => true,
            Err(error) => {
                warn!(episode = %episode, %error, "vibration unavailable");
                false
            }
        };

        let wake_held = match self.platform.wake.acquire(wake_bound) {
            Ok(()) => true,
            Err(error) => {
                warn!(episode = %episode, %error, "wake assertion unavailable");
                false
            }
        };

        let (sink, audio_level) = self.open_audio(episode, siren);

        ResourceSet {
            episode,
            sink,
            audio_level,
            vibrating,
            wake_held,
            volume_audit,
            acquired_at: Utc::now(),
            released: AtomicBool::new(false),
        }
    }

    fn open_audio(
        &self,
        episode: EpisodeId,
        siren: &SirenParams,
    ) -> (Option<Arc<dyn AudioSink>>, DegradationLevel) {
        match self.platform.audio.open_sink(StreamSpec::mono(siren.sample_rate)) {
            Ok(sink) => (Some(sink), DegradationLevel::Full),
            Err(error) => {
                warn!(episode = %episode, %error, "primary audio sink unavailable, trying tone fallback");
                match self.platform.audio.open_tone() {
                    Ok(sink) => (Some(sink), DegradationLevel::Partial),
                    Err(error) => {
                        warn!(episode = %episode, %error, "tone fallback unavailable, episode will be silent");
                        (None, DegradationLevel::Unavailable)
                    }
                }
            }
        }
    }

    /// Release everything the set still holds.
    ///
    /// Idempotent: only the first caller does the work. The caller must have
    /// stopped the render loop before releasing, so no write races the sink
    /// stop. Order: audio sink → vibration → wake assertion (the episode's
    /// pending timeout is cancelled by the controller's token, not here).
    /// Every step is attempted even when an earlier one fails.
    pub fn release(&self, set: &ResourceSet) -> ReleaseReport {
        if set.released.swap(true, Ordering::SeqCst) {
            debug!(episode = %set.episode, "release already done, no-op");
            return ReleaseReport {
                already_released: true,
                failures: Vec::new(),
            };
        }

        let mut failures = Vec::new();

        if let Some(sink) = &set.sink {
            if let Err(error) = sink.stop() {
                warn!(episode = %set.episode, %error, "failed to stop audio sink");
                failures.push(ReleaseFailure {
                    resource: ResourceKind::Audio,
                    error: error.to_string(),
                });
            }
        }

        if set.vibrating {
            if let Err(error) = self.platform.haptics.cancel() {
                warn!(episode = %set.episode, %error, "failed to cancel vibration");
                failures.push(ReleaseFailure {
                    resource: ResourceKind::Vibration,
                    error: error.to_string(),
                });
            }
        }

        if set.wake_held {
            if let Err(error) = self.platform.wake.release() {
                warn!(episode = %set.episode, %error, "failed to release wake assertion");
                failures.push(ReleaseFailure {
                    resource: ResourceKind::Wake,
                    error: error.to_string(),
                });
            }
        }

        info!(
            episode = %set.episode,
            failures = failures.len(),
            "episode resources released"
        );
        ReleaseReport {
            already_released: false,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::sim::{PlatformCall, SimPlatform, SinkKind};
    use crate::platform::{
        AudioOutput, AudioPolicy, HapticDevice, PlatformError, PlatformResult, WakeSource,
    };

    fn guard_with_sim() -> (ResourceGuard, Arc<SimPlatform>) {
        let platform = SimPlatform::new();
        (ResourceGuard::new(platform.handles()), platform)
    }

    #[test]
    fn test_acquire_full_path() {
        let (guard, platform) = guard_with_sim();
        let set = guard.acquire(EpisodeId(1), &SirenParams::default(), Duration::from_secs(70));

        assert_eq!(set.audio_level(), DegradationLevel::Full);
        assert!(set.is_vibrating());
        assert!(set.holds_wake());
        assert!(set.volume_audit().is_some());
        assert!(!set.is_released());

        let journal = platform.journal();
        assert!(matches!(journal[0], PlatformCall::VolumeForced { .. }));
        assert!(matches!(journal[1], PlatformCall::VibrationStarted { .. }));
        assert_eq!(journal[2], PlatformCall::WakeAcquired { bound: Duration::from_secs(70) });
        assert_eq!(journal[3], PlatformCall::SinkOpened { kind: SinkKind::Primary });
    }

    #[test]
    fn test_acquire_degrades_to_tone_fallback() {
        let (guard, platform) = guard_with_sim();
        platform.set_fail_sink_open(true);

        let set = guard.acquire(EpisodeId(1), &SirenParams::default(), Duration::from_secs(70));
        assert_eq!(set.audio_level(), DegradationLevel::Partial);
        assert!(set.sink().is_some());
        assert_eq!(
            platform.count_calls(|c| matches!(c, PlatformCall::SinkOpened { kind: SinkKind::Tone })),
            1
        );
    }

    #[test]
    fn test_acquire_continues_without_any_audio() {
        let (guard, platform) = guard_with_sim();
        platform.set_fail_sink_open(true);
        platform.set_fail_tone_open(true);

        let set = guard.acquire(EpisodeId(1), &SirenParams::default(), Duration::from_secs(70));
        assert_eq!(set.audio_level(), DegradationLevel::Unavailable);
        assert!(set.sink().is_none());
        // Vibration and wake still carry the episode.
        assert!(set.is_vibrating());
        assert!(set.holds_wake());
    }

    #[test]
    fn test_acquire_proceeds_when_volume_denied() {
        let (guard, platform) = guard_with_sim();
        platform.set_deny_volume(true);

        let set = guard.acquire(EpisodeId(1), &SirenParams::default(), Duration::from_secs(70));
        assert!(set.volume_audit().is_none());
        assert_eq!(set.audio_level(), DegradationLevel::Full);
        assert!(set.is_vibrating());
    }

    #[test]
    fn test_release_is_idempotent() {
        let (guard, platform) = guard_with_sim();
        let set = guard.acquire(EpisodeId(1), &SirenParams::default(), Duration::from_secs(70));

        let first = guard.release(&set);
        assert!(first.did_work());
        assert!(first.failures.is_empty());

        let second = guard.release(&set);
        assert!(second.already_released);

        assert_eq!(platform.count_calls(|c| matches!(c, PlatformCall::SinkStopped { .. })), 1);
        assert_eq!(platform.count_calls(|c| *c == PlatformCall::VibrationCancelled), 1);
        assert_eq!(platform.count_calls(|c| *c == PlatformCall::WakeReleased), 1);
    }

    #[test]
    fn test_concurrent_release_does_work_once() {
        let (guard, platform) = guard_with_sim();
        let set = Arc::new(guard.acquire(
            EpisodeId(1),
            &SirenParams::default(),
            Duration::from_secs(70),
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let guard = guard.clone();
            let set = set.clone();
            handles.push(std::thread::spawn(move || guard.release(&set).did_work()));
        }
        let did_work: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(did_work.iter().filter(|w| **w).count(), 1);
        assert_eq!(platform.count_calls(|c| matches!(c, PlatformCall::SinkStopped { .. })), 1);
        assert_eq!(platform.count_calls(|c| *c == PlatformCall::VibrationCancelled), 1);
        assert_eq!(platform.count_calls(|c| *c == PlatformCall::WakeReleased), 1);
    }

    /// Platform whose teardown calls all fail, for exercising the
    /// collect-and-continue release path.
    struct BrokenTeardown {
        inner: Arc<SimPlatform>,
    }

    impl AudioOutput for BrokenTeardown {
        fn open_sink(&self, spec: StreamSpec) -> PlatformResult<Arc<dyn AudioSink>> {
            let _ = self.inner.open_sink(spec)?;
            Ok(Arc::new(BrokenSink))
        }

        fn open_tone(&self) -> PlatformResult<Arc<dyn AudioSink>> {
            Err(PlatformError::Unavailable("no tone".into()))
        }
    }

    struct BrokenSink;

    impl AudioSink for BrokenSink {
        fn write(&self, _samples: &[i16]) -> PlatformResult<()> {
            Ok(())
        }

        fn stop(&self) -> PlatformResult<()> {
            Err(PlatformError::Io("stop failed".into()))
        }
    }

    impl HapticDevice for BrokenTeardown {
        fn start_waveform(&self, pattern: &VibrationPattern) -> PlatformResult<()> {
            self.inner.start_waveform(pattern)
        }

        fn cancel(&self) -> PlatformResult<()> {
            Err(PlatformError::Io("cancel failed".into()))
        }
    }

    impl WakeSource for BrokenTeardown {
        fn acquire(&self, bound: Duration) -> PlatformResult<()> {
            self.inner.acquire(bound)
        }

        fn release(&self) -> PlatformResult<()> {
            Err(PlatformError::Io("release failed".into()))
        }
    }

    impl AudioPolicy for BrokenTeardown {
        fn force_max_volume(&self) -> PlatformResult<VolumeAudit> {
            self.inner.force_max_volume()
        }
    }

    #[test]
    fn test_release_collects_failures_without_aborting() {
        let sim = SimPlatform::new();
        let broken = Arc::new(BrokenTeardown { inner: sim });
        let platform = PlatformHandles {
            audio: broken.clone(),
            haptics: broken.clone(),
            wake: broken.clone(),
            policy: broken,
        };
        let guard = ResourceGuard::new(platform);

        let set = guard.acquire(EpisodeId(1), &SirenParams::default(), Duration::from_secs(70));
        let report = guard.release(&set);

        assert!(report.did_work());
        let kinds: Vec<ResourceKind> = report.failures.iter().map(|f| f.resource).collect();
        assert_eq!(
            kinds,
            vec![ResourceKind::Audio, ResourceKind::Vibration, ResourceKind::Wake]
        );
    }
}
