//! Alerting configuration — siren, alarm, and vibration parameters.
//!
//! Defaults match the production dispatch client. All durations are stored as
//! plain integers so the config can round-trip through TOML; accessor methods
//! expose them as `Duration`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Parameters for the synthesized two-tone siren.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SirenParams {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Low end of the sweep in Hz.
    pub low_hz: f64,
    /// High end of the sweep in Hz.
    pub high_hz: f64,
    /// Length of one full low→high→low cycle in milliseconds.
    pub cycle_ms: u64,
}

impl Default for SirenParams {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            low_hz: 650.0,
            high_hz: 1000.0,
            cycle_ms: 1200,
        }
    }
}

impl SirenParams {
    /// Number of samples in one cycle buffer.
    pub fn samples_per_cycle(&self) -> usize {
        (self.sample_rate as u64 * self.cycle_ms / 1000) as usize
    }
}

/// Parameters governing one alarm episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmParams {
    /// Hard maximum episode duration in seconds.
    pub max_duration_secs: u64,
    /// Extra seconds added to the wake-assertion bound so a crashed episode
    /// cannot hold the device awake past the alarm window.
    pub wake_grace_secs: u64,
    /// Bounded wait, in milliseconds, for the render loop to observe
    /// cancellation before the audio sink handle is stopped.
    pub render_join_timeout_ms: u64,
}

impl Default for AlarmParams {
    fn default() -> Self {
        Self {
            max_duration_secs: 60,
            wake_grace_secs: 10,
            render_join_timeout_ms: 2000,
        }
    }
}

impl AlarmParams {
    /// Maximum episode duration.
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    /// Bound for the wake assertion: episode duration plus grace.
    pub fn wake_bound(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs + self.wake_grace_secs)
    }

    /// Bounded join wait for the render loop.
    pub fn render_join_timeout(&self) -> Duration {
        Duration::from_millis(self.render_join_timeout_ms)
    }
}

/// A vibration timing pattern: alternating off/on segment lengths in
/// milliseconds, starting with an initial delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibrationPattern(pub Vec<u64>);

impl VibrationPattern {
    /// Strong looping pattern for emergency episodes: 1 s on, 0.5 s off.
    pub fn emergency() -> Self {
        Self(vec![0, 1000, 500, 1000, 500, 1000, 500, 1000, 500])
    }

    /// Short double-buzz for case updates.
    pub fn case_update() -> Self {
        Self(vec![0, 300, 100, 300])
    }

    /// Total length of one pass through the pattern.
    pub fn total_ms(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// Top-level configuration for the alerting core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    pub siren: SirenParams,
    pub alarm: AlarmParams,
}
