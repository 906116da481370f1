//! Alarm lifecycle — episode state model and the serialized controller.

pub mod controller;
pub mod state;

pub use controller::AlarmController;
pub use state::{AlarmEpisode, EpisodeId, EpisodeState, StopTrigger, TransitionRecord};
