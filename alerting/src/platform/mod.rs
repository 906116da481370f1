//! Platform device seams.
//!
//! Everything the alarm touches on the host platform — audio output, the
//! haptic motor, wake assertions, volume policy — sits behind these traits so
//! the lifecycle logic is testable and the gateway can run fully simulated.
//! Every capability is an explicit acquire/release pair; nothing here is
//! fire-and-forget.

pub mod sim;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::VibrationPattern;

/// Error type for platform device operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlatformError {
    /// The device exists but cannot be opened right now.
    #[error("resource unavailable: {0}")]
    Unavailable(String),

    /// Platform policy forbids the operation for this process.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The device was open but an operation on it failed.
    #[error("device i/o failure: {0}")]
    Io(String),
}

/// Result type for platform device operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// PCM stream parameters for an audio sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSpec {
    pub sample_rate: u32,
    /// Mono output; the siren has no stereo content.
    pub channels: u16,
}

impl StreamSpec {
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
        }
    }
}

/// An open audio output stream.
///
/// `write` blocks until the device has consumed the buffer, which is what
/// paces the render loop. `stop` releases the underlying device; writes after
/// `stop` fail with `PlatformError::Io`.
pub trait AudioSink: Send + Sync {
    fn write(&self, samples: &[i16]) -> PlatformResult<()>;
    fn stop(&self) -> PlatformResult<()>;
}

/// Factory for audio output streams.
pub trait AudioOutput: Send + Sync {
    /// Open the primary alarm-class PCM sink.
    fn open_sink(&self, spec: StreamSpec) -> PlatformResult<Arc<dyn AudioSink>>;

    /// Open the low-fidelity tone output used when the primary sink is
    /// unavailable.
    fn open_tone(&self) -> PlatformResult<Arc<dyn AudioSink>>;
}

/// The device vibration motor.
pub trait HapticDevice: Send + Sync {
    /// Begin repeating the pattern indefinitely until `cancel` is called.
    fn start_waveform(&self, pattern: &VibrationPattern) -> PlatformResult<()>;

    /// Stop any running vibration.
    fn cancel(&self) -> PlatformResult<()>;
}

/// Time-bounded device wake assertions.
///
/// The bound is a crash guard: even if release is never called, the platform
/// drops the assertion once the bound elapses.
pub trait WakeSource: Send + Sync {
    fn acquire(&self, bound: Duration) -> PlatformResult<()>;
    fn release(&self) -> PlatformResult<()>;
}

/// Audit record of the output state found before the override was applied.
///
/// Recorded for diagnostics only — an emergency episode intentionally
/// overrides the operator's silence preferences and never restores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeAudit {
    /// Prior volume per channel, as (channel name, level, max level).
    pub prior_levels: Vec<(String, u32, u32)>,
    /// Whether the device was in a silent/muted ringer state.
    pub was_silenced: bool,
}

/// System output volume and ringer-mode policy.
pub trait AudioPolicy: Send + Sync {
    /// Force alarm-class and related output channels to maximum and clear any
    /// silent-mode override, where platform policy allows. Returns what was
    /// found beforehand, for auditability.
    fn force_max_volume(&self) -> PlatformResult<VolumeAudit>;
}

/// The full set of device seams the resource guard drives.
#[derive(Clone)]
pub struct PlatformHandles {
    pub audio: Arc<dyn AudioOutput>,
    pub haptics: Arc<dyn HapticDevice>,
    pub wake: Arc<dyn WakeSource>,
    pub policy: Arc<dyn AudioPolicy>,
}
