//! Service wiring and the message feed loop.

use std::sync::Arc;

use alerting::config::AlertingConfig;
use alerting::escalation::{EscalationRouter, RoutedOutcome};
use alerting::events::{EventBus, SharedEventBus};
use alerting::lifecycle::AlarmController;
use alerting::message::InboundMessage;
use alerting::platform::sim::SimPlatform;
use alerting::surface::SurfaceArbiter;
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::shell::{LogNavigator, LogNotifier};

/// The assembled alerting pipeline on a simulated platform.
pub struct DispatchService {
    router: EscalationRouter,
    controller: AlarmController,
    surface: Arc<SurfaceArbiter>,
    platform: Arc<SimPlatform>,
    events: SharedEventBus,
    config: AlertingConfig,
}

impl DispatchService {
    pub fn new(config: GatewayConfig) -> Self {
        let platform = SimPlatform::new();
        let events = EventBus::new().shared();
        let controller = AlarmController::new(
            platform.handles(),
            config.alerting.clone(),
            events.clone(),
        );
        let surface = Arc::new(SurfaceArbiter::new(
            controller.clone(),
            Arc::new(LogNavigator),
            events.clone(),
        ));
        let router = EscalationRouter::new(
            controller.clone(),
            surface.clone(),
            Arc::new(LogNotifier::default()),
            events.clone(),
        );
        Self {
            router,
            controller,
            surface,
            platform,
            events,
            config: config.alerting,
        }
    }

    pub fn controller(&self) -> &AlarmController {
        &self.controller
    }

    pub fn surface(&self) -> &Arc<SurfaceArbiter> {
        &self.surface
    }

    pub fn platform(&self) -> &Arc<SimPlatform> {
        &self.platform
    }

    pub fn events(&self) -> &SharedEventBus {
        &self.events
    }

    /// Log the notification channels the host shell would install.
    pub fn install_channels(&self) {
        for spec in self.router.channel_specs() {
            info!(
                channel = spec.class.channel_id(),
                name = %spec.name,
                importance = ?spec.importance,
                bypass_dnd = spec.bypass_dnd,
                "notification channel installed"
            );
        }
    }

    /// Route one JSON payload line.
    ///
    /// Blank lines are skipped; an undecodable line is logged and dropped —
    /// a bad message must never take the pipeline down.
    pub async fn handle_line(&self, line: &str) -> Option<RoutedOutcome> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<InboundMessage>(line) {
            Ok(message) => Some(self.router.route(&message).await),
            Err(error) => {
                warn!(%error, "dropping undecodable message line");
                None
            }
        }
    }

    /// Consume a JSON-lines feed until it ends, then stop any ringing
    /// episode so every resource is released before returning.
    pub async fn run<R>(&self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!(
            max_duration_secs = self.config.alarm.max_duration_secs,
            sample_rate = self.config.siren.sample_rate,
            "message feed starting"
        );

        let mut lines = reader.lines();
        let mut routed = 0_u64;
        while let Some(line) = lines.next_line().await? {
            if self.handle_line(&line).await.is_some() {
                routed += 1;
            }
        }

        self.controller.shutdown().await;
        info!(routed, "message feed drained, gateway idle");
        Ok(())
    }
}
