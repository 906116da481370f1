//! Physical resource acquisition and release for alarm episodes.

pub mod guard;

pub use guard::{ReleaseFailure, ReleaseReport, ResourceGuard, ResourceKind, ResourceSet};
