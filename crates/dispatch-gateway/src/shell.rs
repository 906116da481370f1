//! Tracing-backed platform shells.
//!
//! Stand-ins for the host notification and navigation layers: every request
//! is logged with structured fields instead of reaching a real device, which
//! is all a replay run needs.

use std::sync::atomic::{AtomicU64, Ordering};

use alerting::navigation::{NavigationRequest, Navigator};
use alerting::notify::{NotificationId, NotificationRequest, Notifier};
use alerting::platform::PlatformResult;
use async_trait::async_trait;
use tracing::info;

/// Notifier that logs each request and allocates sequential ids.
#[derive(Default)]
pub struct LogNotifier {
    seq: AtomicU64,
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, request: NotificationRequest) -> PlatformResult<NotificationId> {
        let id = NotificationId(self.seq.fetch_add(1, Ordering::SeqCst) + 1);
        info!(
            %id,
            class = ?request.class,
            channel = request.class.channel_id(),
            ongoing = request.ongoing,
            actions = request.actions.len(),
            title = %request.title,
            "notification posted"
        );
        Ok(id)
    }

    async fn cancel(&self, id: NotificationId) -> PlatformResult<()> {
        info!(%id, "notification cancelled");
        Ok(())
    }
}

/// Navigator that logs the requested route.
pub struct LogNavigator;

#[async_trait]
impl Navigator for LogNavigator {
    async fn navigate(&self, request: NavigationRequest) -> PlatformResult<()> {
        info!(case = %request.case, target = %request.target, "navigation requested");
        Ok(())
    }
}
