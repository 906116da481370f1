//! Simulated platform devices.
//!
//! In-memory implementations of the platform seams with a shared call
//! journal, used by the gateway's simulated mode and by integration tests.
//! Failure toggles let tests exercise the degraded paths (sink open failure,
//! denied volume override, missing vibrator).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

use super::{
    AudioOutput, AudioPolicy, AudioSink, HapticDevice, PlatformError, PlatformHandles,
    PlatformResult, StreamSpec, VolumeAudit, WakeSource,
};
use crate::config::VibrationPattern;

/// Which audio path a simulated sink belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Primary,
    Tone,
}

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    VolumeForced { was_silenced: bool },
    VibrationStarted { pattern: VibrationPattern },
    VibrationCancelled,
    WakeAcquired { bound: Duration },
    WakeReleased,
    SinkOpened { kind: SinkKind },
    SinkStopped { kind: SinkKind },
}

type Journal = Mutex<Vec<PlatformCall>>;

/// Simulated platform. One instance implements all four device seams; clone
/// the `Arc` and coerce via [`SimPlatform::handles`].
pub struct SimPlatform {
    journal: Arc<Journal>,
    fail_sink_open: AtomicBool,
    fail_tone_open: AtomicBool,
    deny_volume: AtomicBool,
    fail_haptics: AtomicBool,
    silenced: AtomicBool,
    write_delay: Duration,
    samples_written: Arc<AtomicU64>,
}

impl SimPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            journal: Arc::new(Mutex::new(Vec::new())),
            fail_sink_open: AtomicBool::new(false),
            fail_tone_open: AtomicBool::new(false),
            deny_volume: AtomicBool::new(false),
            fail_haptics: AtomicBool::new(false),
            silenced: AtomicBool::new(false),
            write_delay: Duration::from_millis(2),
            samples_written: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Device handle bundle for wiring into the resource guard.
    pub fn handles(self: &Arc<Self>) -> PlatformHandles {
        PlatformHandles {
            audio: self.clone(),
            haptics: self.clone(),
            wake: self.clone(),
            policy: self.clone(),
        }
    }

    /// Snapshot of every device call made so far, in order.
    pub fn journal(&self) -> Vec<PlatformCall> {
        self.journal.lock().expect("journal lock poisoned").clone()
    }

    /// Count journal entries matching a predicate.
    pub fn count_calls(&self, pred: impl Fn(&PlatformCall) -> bool) -> usize {
        self.journal().iter().filter(|c| pred(c)).count()
    }

    /// Total PCM samples written across all sinks.
    pub fn samples_written(&self) -> u64 {
        self.samples_written.load(Ordering::SeqCst)
    }

    pub fn set_fail_sink_open(&self, fail: bool) {
        self.fail_sink_open.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_tone_open(&self, fail: bool) {
        self.fail_tone_open.store(fail, Ordering::SeqCst);
    }

    pub fn set_deny_volume(&self, deny: bool) {
        self.deny_volume.store(deny, Ordering::SeqCst);
    }

    pub fn set_fail_haptics(&self, fail: bool) {
        self.fail_haptics.store(fail, Ordering::SeqCst);
    }

    /// Put the simulated device into a silenced ringer state.
    pub fn set_silenced(&self, silenced: bool) {
        self.silenced.store(silenced, Ordering::SeqCst);
    }

    fn record(&self, call: PlatformCall) {
        debug!(?call, "sim platform call");
        self.journal.lock().expect("journal lock poisoned").push(call);
    }
}

impl AudioOutput for SimPlatform {
    fn open_sink(&self, spec: StreamSpec) -> PlatformResult<Arc<dyn AudioSink>> {
        if self.fail_sink_open.load(Ordering::SeqCst) {
            return Err(PlatformError::Unavailable("sim: primary sink disabled".into()));
        }
        let _ = spec;
        self.record(PlatformCall::SinkOpened { kind: SinkKind::Primary });
        Ok(Arc::new(SimSink {
            kind: SinkKind::Primary,
            journal: self.journal.clone(),
            stopped: AtomicBool::new(false),
            write_delay: self.write_delay,
            samples_written: self.samples_written.clone(),
        }))
    }

    fn open_tone(&self) -> PlatformResult<Arc<dyn AudioSink>> {
        if self.fail_tone_open.load(Ordering::SeqCst) {
            return Err(PlatformError::Unavailable("sim: tone output disabled".into()));
        }
        self.record(PlatformCall::SinkOpened { kind: SinkKind::Tone });
        Ok(Arc::new(SimSink {
            kind: SinkKind::Tone,
            journal: self.journal.clone(),
            stopped: AtomicBool::new(false),
            write_delay: self.write_delay,
            samples_written: self.samples_written.clone(),
        }))
    }
}

impl HapticDevice for SimPlatform {
    fn start_waveform(&self, pattern: &VibrationPattern) -> PlatformResult<()> {
        if self.fail_haptics.load(Ordering::SeqCst) {
            return Err(PlatformError::Unavailable("sim: vibrator disabled".into()));
        }
        self.record(PlatformCall::VibrationStarted { pattern: pattern.clone() });
        Ok(())
    }

    fn cancel(&self) -> PlatformResult<()> {
        self.record(PlatformCall::VibrationCancelled);
        Ok(())
    }
}

impl WakeSource for SimPlatform {
    fn acquire(&self, bound: Duration) -> PlatformResult<()> {
        self.record(PlatformCall::WakeAcquired { bound });
        Ok(())
    }

    fn release(&self) -> PlatformResult<()> {
        self.record(PlatformCall::WakeReleased);
        Ok(())
    }
}

impl AudioPolicy for SimPlatform {
    fn force_max_volume(&self) -> PlatformResult<VolumeAudit> {
        if self.deny_volume.load(Ordering::SeqCst) {
            return Err(PlatformError::PermissionDenied("sim: volume policy locked".into()));
        }
        let was_silenced = self.silenced.swap(false, Ordering::SeqCst);
        self.record(PlatformCall::VolumeForced { was_silenced });
        Ok(VolumeAudit {
            prior_levels: vec![
                ("alarm".into(), 4, 7),
                ("ring".into(), 4, 7),
                ("music".into(), 4, 7),
                ("notification".into(), 4, 7),
            ],
            was_silenced,
        })
    }
}

struct SimSink {
    kind: SinkKind,
    journal: Arc<Journal>,
    stopped: AtomicBool,
    write_delay: Duration,
    samples_written: Arc<AtomicU64>,
}

impl AudioSink for SimSink {
    fn write(&self, samples: &[i16]) -> PlatformResult<()> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(PlatformError::Io("sim: write after stop".into()));
        }
        // Emulate the blocking device write that paces the render loop.
        std::thread::sleep(self.write_delay);
        self.samples_written.fetch_add(samples.len() as u64, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> PlatformResult<()> {
        self.stopped.store(true, Ordering::SeqCst);
        self.journal
            .lock()
            .expect("journal lock poisoned")
            .push(PlatformCall::SinkStopped { kind: self.kind });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_open_write_stop() {
        let platform = SimPlatform::new();
        let sink = platform.open_sink(StreamSpec::mono(44_100)).unwrap();

        sink.write(&[0_i16; 64]).unwrap();
        assert_eq!(platform.samples_written(), 64);

        sink.stop().unwrap();
        assert!(sink.write(&[0_i16; 64]).is_err());

        let journal = platform.journal();
        assert_eq!(journal[0], PlatformCall::SinkOpened { kind: SinkKind::Primary });
        assert_eq!(journal[1], PlatformCall::SinkStopped { kind: SinkKind::Primary });
    }

    #[test]
    fn test_failure_toggles() {
        let platform = SimPlatform::new();
        platform.set_fail_sink_open(true);
        platform.set_deny_volume(true);
        platform.set_fail_haptics(true);

        assert!(matches!(
            platform.open_sink(StreamSpec::mono(44_100)),
            Err(PlatformError::Unavailable(_))
        ));
        assert!(matches!(
            platform.force_max_volume(),
            Err(PlatformError::PermissionDenied(_))
        ));
        assert!(platform.start_waveform(&VibrationPattern::emergency()).is_err());

        // Tone fallback still works.
        assert!(platform.open_tone().is_ok());
    }

    #[test]
    fn test_volume_audit_records_silenced_state() {
        let platform = SimPlatform::new();
        platform.set_silenced(true);

        let audit = platform.force_max_volume().unwrap();
        assert!(audit.was_silenced);
        assert!(!audit.prior_levels.is_empty());

        // Silent mode was cleared, not restored.
        let audit = platform.force_max_volume().unwrap();
        assert!(!audit.was_silenced);
    }
}
