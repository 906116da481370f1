//! Degraded-mode reporting for the alarm's audio path.
//!
//! A missed emergency alert is worse than a degraded one, so device failures
//! never fail an episode — they step it down a tier instead:
//!
//! ```text
//! Acquire audio
//!   ├─ Primary sink opens → Full (synthesized siren)
//!   ├─ Primary fails, tone output opens → Partial (repeating tone pulse)
//!   └─ Both fail → Unavailable (vibration + wake carry the episode)
//! ```

use serde::{Deserialize, Serialize};

/// How much of the audio path is available for an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationLevel {
    /// Primary sink open, full siren synthesis.
    Full,
    /// Tone-pulse fallback on the low-fidelity output.
    Partial,
    /// No audio at all; the episode continues on vibration and wake.
    Unavailable,
}

impl DegradationLevel {
    /// Whether any audio output is active.
    pub fn is_audible(self) -> bool {
        self != Self::Unavailable
    }

    /// Whether the path has degraded below the primary tier.
    pub fn is_degraded(self) -> bool {
        self != Self::Full
    }
}

impl std::fmt::Display for DegradationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Partial => write!(f, "partial"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}
