//! The web view as a bridge runtime.

use engine::traits::{BridgeRuntime, CapError, CapResult};
use engine::{LaunchIntent, NormalizedIntent, WindowConfig};
use std::sync::Mutex;
use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindowBuilder};

/// Event carrying a new intent to an already running web view.
pub const LAUNCH_INTENT_EVENT: &str = "launch-intent";

/// The latest intent, kept for the frontend to pull once it has loaded. An
/// event sent during startup would arrive before any listener exists.
#[derive(Default)]
pub struct PendingIntent(Mutex<Option<LaunchIntent>>);

impl PendingIntent {
    pub fn get(&self) -> Option<LaunchIntent> {
        self.0.lock().ok().and_then(|slot| slot.clone())
    }

    fn replace(&self, intent: Option<LaunchIntent>) -> CapResult<()> {
        let mut slot = self
            .0
            .lock()
            .map_err(|_| CapError::Bridge("pending intent lock poisoned".into()))?;
        *slot = intent;
        Ok(())
    }
}

pub struct TauriBridge {
    app: AppHandle,
}

impl TauriBridge {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn pending(&self) -> CapResult<tauri::State<'_, PendingIntent>> {
        self.app
            .try_state::<PendingIntent>()
            .ok_or_else(|| CapError::Bridge("pending intent slot is not managed".into()))
    }
}

impl BridgeRuntime for TauriBridge {
    fn start(&self, intent: NormalizedIntent, window: &WindowConfig) -> CapResult<()> {
        self.pending()?.replace(intent.into_intent())?;

        let builder = WebviewWindowBuilder::new(&self.app, window.label, WebviewUrl::default());
        // Mobile web views always fill the screen and have no chrome.
        #[cfg(desktop)]
        let builder = builder
            .title(window.title)
            .fullscreen(window.fullscreen)
            .decorations(!window.borderless);
        builder
            .build()
            .map_err(|e| CapError::Bridge(format!("creating window {}: {}", window.label, e)))?;
        Ok(())
    }

    fn deliver(&self, intent: NormalizedIntent) -> CapResult<()> {
        let intent = intent.into_intent();
        self.pending()?.replace(intent.clone())?;
        self.app
            .emit(LAUNCH_INTENT_EVENT, intent)
            .map_err(|e| CapError::Bridge(format!("emitting {}: {}", LAUNCH_INTENT_EVENT, e)))
    }
}
