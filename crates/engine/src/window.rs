//! Window chrome requested from the platform at startup.

use serde::Serialize;

/// Declarative window presentation handed to the bridge runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowConfig {
    pub label: &'static str,
    pub title: &'static str,
    pub fullscreen: bool,
    /// No title bar or system decorations.
    pub borderless: bool,
}

/// The shell always runs borderless and fullscreen.
pub const SHELL_WINDOW: WindowConfig = WindowConfig {
    label: "main",
    title: "Deep Link Shell",
    fullscreen: true,
    borderless: true,
};
