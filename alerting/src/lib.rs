//! Emergency alert lifecycle for a dispatch application.
//!
//! Guarantees a human operator perceives and acknowledges a critical case
//! assignment even if the device is asleep, silenced, or locked. The core is
//! a concurrency-sensitive state machine that synthesizes a siren waveform in
//! real time, coordinates it with vibration, device wake, and a blocking
//! full-screen alert surface, and releases that bundle of resources exactly
//! once no matter which asynchronous trigger initiates the stop.
//!
//! # Modules
//!
//! - [`escalation`] — classifies inbound messages and routes them to an alarm
//!   episode, an alert surface, and a notification plan
//! - [`lifecycle`] — the serialized alarm controller owning the single
//!   in-flight episode
//! - [`resources`] — best-effort acquisition and idempotent release of the
//!   episode's device resources
//! - [`siren`] — pure two-tone waveform synthesis plus the cancellable
//!   render loop
//! - [`surface`] — arbitration of the blocking full-screen presentation
//! - [`platform`] — trait seams for the host devices, with an in-memory
//!   simulation for tests and the gateway
//! - [`notify`] / [`navigation`] — outbound notification and navigation
//!   contracts consumed by the platform shell
//! - [`events`] — broadcast bus and bounded history of lifecycle events

pub mod config;
pub mod escalation;
pub mod events;
pub mod lifecycle;
pub mod message;
pub mod navigation;
pub mod notify;
pub mod platform;
pub mod resilience;
pub mod resources;
pub mod siren;
pub mod surface;

pub use config::AlertingConfig;
pub use escalation::{classify, EscalationRouter, RoutedOutcome, Urgency};
pub use events::{AlertEvent, EventBus, SharedEventBus};
pub use lifecycle::{AlarmController, AlarmEpisode, EpisodeId, EpisodeState, StopTrigger};
pub use message::{CaseDetails, CaseRef, InboundMessage};
pub use resilience::DegradationLevel;
pub use surface::{PresentationHandle, SurfaceArbiter};
