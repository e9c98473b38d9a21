use crate::normalize::NormalizedIntent;
use crate::window::WindowConfig;

/// Result type for collaborator operations that may be unsupported.
pub type CapResult<T> = Result<T, CapError>;

#[derive(Debug, thiserror::Error)]
pub enum CapError {
    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("bridge error: {0}")]
    Bridge(String),
}

// ---------------------------------------------------------------------------
// Bridge runtime
// ---------------------------------------------------------------------------

/// The embedded web-view runtime that takes over once the intent has been
/// examined. The engine never looks at what it does with the intent.
pub trait BridgeRuntime: Send + Sync {
    /// Cold start: present the window and hand over the launch intent.
    fn start(&self, intent: NormalizedIntent, window: &WindowConfig) -> CapResult<()>;

    /// A new intent for an instance that is already running.
    fn deliver(&self, intent: NormalizedIntent) -> CapResult<()>;
}

impl<T: BridgeRuntime + ?Sized> BridgeRuntime for std::sync::Arc<T> {
    fn start(&self, intent: NormalizedIntent, window: &WindowConfig) -> CapResult<()> {
        (**self).start(intent, window)
    }

    fn deliver(&self, intent: NormalizedIntent) -> CapResult<()> {
        (**self).deliver(intent)
    }
}
