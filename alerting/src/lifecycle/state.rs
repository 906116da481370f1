//! Episode state model — typed states, stop triggers, and the legal
//! transition table.
//!
//! The controller is the only writer of episode state; this module gives it
//! a typed vocabulary so every transition is auditable and illegal ones are
//! caught at the boundary instead of corrupting the slot.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::CaseRef;
use crate::resilience::DegradationLevel;

/// Opaque, process-wide monotonically increasing episode token.
///
/// Stale triggers are detected by comparing ids: a trigger carrying an id
/// other than the current episode's must observe a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EpisodeId(pub u64);

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ep-{}", self.0)
    }
}

/// The alarm lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeState {
    /// No episode in flight; ready to start one.
    Idle,
    /// An episode holds resources and the siren is rendering.
    Ringing,
    /// Teardown complete for the finished episode; transient, collapses to
    /// `Idle` immediately.
    Stopped,
}

impl fmt::Display for EpisodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Ringing => write!(f, "ringing"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Legal transitions: `Idle → Ringing → Stopped → Idle`.
pub fn is_legal_transition(from: EpisodeState, to: EpisodeState) -> bool {
    use EpisodeState::*;
    matches!((from, to), (Idle, Ringing) | (Ringing, Stopped) | (Stopped, Idle))
}

/// What initiated an episode stop. Whichever trigger fires first wins; the
/// rest observe the episode already stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopTrigger {
    /// The hard maximum duration elapsed with no operator action.
    Timeout,
    /// Operator acknowledged via the alert surface or notification action.
    Acknowledged,
    /// Operator chose to open the case.
    GoToCase,
    /// Operator reported an excuse instead of taking the case.
    Excuse,
    /// Operator tapped the surface to silence the alarm.
    Silenced,
    /// A newer episode replaced this one.
    Superseded,
    /// The host process is shutting down.
    Shutdown,
}

impl fmt::Display for StopTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Acknowledged => write!(f, "acknowledged"),
            Self::GoToCase => write!(f, "go_to_case"),
            Self::Excuse => write!(f, "excuse"),
            Self::Silenced => write!(f, "silenced"),
            Self::Superseded => write!(f, "superseded"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Snapshot of one in-flight (or finished) alarm episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmEpisode {
    pub id: EpisodeId,
    /// Case that triggered the episode, carried through to the surface and
    /// the post-acknowledgment navigation target.
    pub case: Option<CaseRef>,
    pub started_at: DateTime<Utc>,
    /// Hard wall-clock bound on the episode.
    pub max_duration: Duration,
    /// Audio path tier the episode came up with.
    pub audio: DegradationLevel,
}

/// One recorded lifecycle transition, for diagnostics and replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub episode: EpisodeId,
    pub from: EpisodeState,
    pub to: EpisodeState,
    /// Present on `Ringing → Stopped` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<StopTrigger>,
    pub at: DateTime<Utc>,
}
