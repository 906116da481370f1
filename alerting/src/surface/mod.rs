//! Blocking full-screen alert surface arbitration.

pub mod arbiter;

pub use arbiter::{BackDisposition, PresentationHandle, SurfaceAction, SurfaceArbiter};
