//! User-configurable auto-refresh policy, persisted as JSON under one
//! settings key.

use crate::error::{RefreshError, Result};
use bridge_traits::settings::SettingsStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Settings key the policy record lives under.
pub const POLICY_KEY: &str = "refreshPolicy";

/// When and whether the visibility coordinator may fire a refresh.
///
/// Read at evaluation time, not cached at registration, so a mid-session
/// settings change takes effect on the next visibility transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshPolicy {
    pub auto_refresh_enabled: bool,
    /// Minimum time the page must have been hidden before a refresh fires.
    pub hidden_threshold_seconds: u64,
    /// Minimum time between two refresh firings.
    pub cooldown_period_seconds: u64,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            auto_refresh_enabled: true,
            hidden_threshold_seconds: 30,
            cooldown_period_seconds: 300,
        }
    }
}

impl RefreshPolicy {
    pub fn hidden_threshold(&self) -> Duration {
        Duration::from_secs(self.hidden_threshold_seconds)
    }

    pub fn cooldown_period(&self) -> Duration {
        Duration::from_secs(self.cooldown_period_seconds)
    }
}

/// Reads and writes the [`RefreshPolicy`] through the host's key-value
/// settings storage.
#[derive(Clone)]
pub struct RefreshPolicyStore {
    settings: Arc<dyn SettingsStore>,
}

impl RefreshPolicyStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Load the persisted policy. Absent or unreadable records fall back to
    /// the defaults; storage failures propagate.
    pub async fn load(&self) -> Result<RefreshPolicy> {
        match self.settings.get_string(POLICY_KEY).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(policy) => Ok(policy),
                Err(error) => {
                    warn!(%error, "unreadable refresh policy, using defaults");
                    Ok(RefreshPolicy::default())
                }
            },
            None => Ok(RefreshPolicy::default()),
        }
    }

    pub async fn save(&self, policy: &RefreshPolicy) -> Result<()> {
        let raw = serde_json::to_string(policy).map_err(|e| RefreshError::Encode(e.to_string()))?;
        self.settings.set_string(POLICY_KEY, &raw).await?;
        Ok(())
    }
}
