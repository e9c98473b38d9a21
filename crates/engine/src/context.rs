//! Application context – holds the bridge runtime and launch settings, and
//! runs the handoff from OS intent to bridge.

use crate::intent::LaunchIntent;
use crate::normalize::{MalformedUriPolicy, NormalizeError, Outcome};
use crate::platform::{LoggingBridge, RecordingBridge};
use crate::traits::*;
use crate::window::{WindowConfig, SHELL_WINDOW};
use serde::{Deserialize, Serialize};

/// How an intent reached the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Activity creation (cold start).
    Create,
    /// A new intent for an instance that is already running.
    NewIntent,
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Bridge(#[from] CapError),
}

/// What the bridge was handed for a single delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchReport {
    pub delivery: Delivery,
    pub outcome: Outcome,
    pub intent: Option<LaunchIntent>,
}

/// Central context for launch handling.
///
/// Holds the bridge as a trait object so callers (CLI / Tauri) can swap
/// implementations (e.g. a recording bridge vs the real web view).
pub struct AppContext {
    bridge: Box<dyn BridgeRuntime>,
    window: WindowConfig,
    policy: MalformedUriPolicy,
}

impl AppContext {
    pub fn new(bridge: Box<dyn BridgeRuntime>) -> Self {
        Self {
            bridge,
            window: SHELL_WINDOW,
            policy: MalformedUriPolicy::default(),
        }
    }

    /// Context that logs every handoff instead of starting a web view.
    pub fn default_platform() -> Self {
        Self::new(Box::new(LoggingBridge))
    }

    /// Context suitable for headless / CI environments.
    pub fn default_headless() -> Self {
        Self::new(Box::new(RecordingBridge::new()))
    }

    pub fn with_policy(mut self, policy: MalformedUriPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    pub fn bridge(&self) -> &dyn BridgeRuntime {
        self.bridge.as_ref()
    }

    pub fn window(&self) -> &WindowConfig {
        &self.window
    }

    pub fn policy(&self) -> MalformedUriPolicy {
        self.policy
    }

    /// Normalize `intent` and hand it to the bridge.
    ///
    /// Both delivery paths normalize the same way; they differ only in which
    /// bridge entry point receives the result. Each call is independent.
    pub fn launch(
        &self,
        delivery: Delivery,
        intent: Option<LaunchIntent>,
    ) -> Result<LaunchReport, LaunchError> {
        let normalized = self.policy.apply(intent)?;
        let report = LaunchReport {
            delivery,
            outcome: normalized.outcome().clone(),
            intent: normalized.intent().cloned(),
        };

        match delivery {
            Delivery::Create => self.bridge.start(normalized, &self.window)?,
            Delivery::NewIntent => self.bridge.deliver(normalized)?,
        }

        tracing::info!(?delivery, outcome = ?report.outcome, "intent handed to bridge");
        Ok(report)
    }
}
