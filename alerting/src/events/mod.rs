//! Lifecycle event bus.
//!
//! Pub/sub for alert lifecycle events using Tokio broadcast channels, with a
//! bounded in-memory history for diagnostics and tests.

pub mod bus;
pub mod types;

pub use bus::{EventBus, SharedEventBus, HISTORY_CAPACITY};
pub use types::AlertEvent;
