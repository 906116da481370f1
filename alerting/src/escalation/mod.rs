//! Escalation — urgency classification and message routing.

pub mod classify;
pub mod router;

pub use classify::{classify, Urgency};
pub use router::{EscalationRouter, RoutedOutcome};
