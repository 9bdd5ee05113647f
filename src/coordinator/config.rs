use std::time::Duration;

use crate::settings::{CompanionSettings, ScaleMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// How often the agent's busy flag is sampled after a dispatch.
    pub poll_interval: Duration,
    /// Upper bound on waiting for the agent to go idle. Running past it is
    /// an unknown outcome, not a failure.
    pub confirm_timeout: Duration,
    pub scale_mode: ScaleMode,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from(&CompanionSettings::default())
    }
}

impl From<&CompanionSettings> for CoordinatorConfig {
    fn from(settings: &CompanionSettings) -> Self {
        Self {
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
            confirm_timeout: Duration::from_millis(settings.confirm_timeout_ms),
            scale_mode: settings.scale_mode,
        }
    }
}
