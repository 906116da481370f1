//! Dispatch gateway — a thin shell around the alerting core.
//!
//! Feeds push messages (JSON lines from stdin or a replay file) through the
//! escalation router against the simulated platform, with tracing-backed
//! notification and navigation shells. Everything with a design problem
//! lives in the `alerting` crate; this one only wires it up.

pub mod config;
pub mod service;
pub mod shell;

pub use config::GatewayConfig;
pub use service::DispatchService;
