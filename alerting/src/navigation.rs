//! Outbound navigation contract.
//!
//! Once the operator acknowledges a case, the core emits a navigation
//! request; the host application's navigation layer consumes it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::message::CaseRef;
use crate::platform::PlatformResult;

/// A request to open an application route for a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub case: CaseRef,
    /// Application route, e.g. `/dashboard/cases/{case_id}`.
    pub target: String,
}

impl NavigationRequest {
    /// The case-detail route for a case.
    pub fn to_case(case: CaseRef) -> Self {
        let target = format!("/dashboard/cases/{}", case.as_str());
        Self { case, target }
    }
}

/// Host navigation seam.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, request: NavigationRequest) -> PlatformResult<()>;
}
