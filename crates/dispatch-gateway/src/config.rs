//! Gateway configuration.
//!
//! Wraps the alerting core's config with optional TOML-file loading and
//! environment overrides, so replay runs can shorten the alarm window
//! without recompiling.

use std::path::Path;

use alerting::AlertingConfig;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub alerting: AlertingConfig,
}

impl GatewayConfig {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(secs) = env_u64("DISPATCH_MAX_DURATION_SECS") {
            self.alerting.alarm.max_duration_secs = secs;
        }
        if let Some(secs) = env_u64("DISPATCH_WAKE_GRACE_SECS") {
            self.alerting.alarm.wake_grace_secs = secs;
        }
        if let Some(rate) = env_u64("DISPATCH_SAMPLE_RATE") {
            self.alerting.siren.sample_rate = rate as u32;
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}
