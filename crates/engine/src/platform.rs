//! Bridge runtimes that need no web view.
//!
//! - [`LoggingBridge`]: logs each handoff, used by the CLI
//! - [`RecordingBridge`]: keeps each handoff for inspection (headless, tests)

use crate::intent::LaunchIntent;
use crate::normalize::{NormalizedIntent, Outcome};
use crate::traits::*;
use crate::window::WindowConfig;
use serde::Serialize;
use std::sync::Mutex;

// ===========================================================================
// Logging bridge
// ===========================================================================

pub struct LoggingBridge;

impl BridgeRuntime for LoggingBridge {
    fn start(&self, intent: NormalizedIntent, window: &WindowConfig) -> CapResult<()> {
        tracing::info!(
            window = window.label,
            fullscreen = window.fullscreen,
            borderless = window.borderless,
            uri = intent.intent().and_then(|i| i.uri.as_ref()).map(|u| u.as_str()),
            "bridge start"
        );
        Ok(())
    }

    fn deliver(&self, intent: NormalizedIntent) -> CapResult<()> {
        tracing::info!(
            uri = intent.intent().and_then(|i| i.uri.as_ref()).map(|u| u.as_str()),
            "bridge deliver"
        );
        Ok(())
    }
}

// ===========================================================================
// Recording bridge
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    Started {
        intent: Option<LaunchIntent>,
        outcome: Outcome,
        window: WindowConfig,
    },
    Delivered {
        intent: Option<LaunchIntent>,
        outcome: Outcome,
    },
}

#[derive(Default)]
pub struct RecordingBridge {
    events: Mutex<Vec<BridgeEvent>>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: BridgeEvent) -> CapResult<()> {
        self.events
            .lock()
            .map_err(|_| CapError::Bridge("recording bridge lock poisoned".into()))?
            .push(event);
        Ok(())
    }
}

impl BridgeRuntime for RecordingBridge {
    fn start(&self, intent: NormalizedIntent, window: &WindowConfig) -> CapResult<()> {
        let (intent, outcome) = intent.into_parts();
        self.push(BridgeEvent::Started {
            intent,
            outcome,
            window: *window,
        })
    }

    fn deliver(&self, intent: NormalizedIntent) -> CapResult<()> {
        let (intent, outcome) = intent.into_parts();
        self.push(BridgeEvent::Delivered { intent, outcome })
    }
}
