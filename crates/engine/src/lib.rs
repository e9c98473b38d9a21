//! Engine crate – launch-intent handling for the deep-link shell.
//!
//! Everything that decides what the bridge runtime receives lives here:
//! the intent model, the deep-link normalizer and the launch adapter. It
//! does NOT depend on Tauri runtime types, so it can be used by both the
//! GUI wrapper and the headless CLI harness.

pub mod commands;
pub mod context;
pub mod intent;
pub mod normalize;
pub mod platform;
pub mod scenario;
pub mod traits;
pub mod types;
pub mod window;

// Re-exports for convenience
pub use commands::CommandRegistry;
pub use context::{AppContext, Delivery, LaunchError, LaunchReport};
pub use intent::{DeepLink, IntentAction, LaunchIntent};
pub use normalize::{normalize, try_normalize, MalformedUriPolicy, NormalizedIntent, Outcome};
pub use types::{CommandResult, ErrorCode, ErrorInfo, Status};
pub use window::{WindowConfig, SHELL_WINDOW};
