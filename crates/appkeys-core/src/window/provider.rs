// Window System Trait
//
// This module defines the queries the remapper needs from the windowing
// system: class hints, the window tree, focus, and key grabs.

use std::fmt;

use crate::Key;

/// Window handle (an X11 window id)
pub type WindowId = u32;

/// Error type for window system operations
#[derive(Debug, Clone, PartialEq)]
pub enum WindowError {
    /// Not connected to the display
    NotConnected,

    /// Query failed (window gone, bad reply, ...)
    QueryFailed(String),

    /// A grab request was rejected
    GrabFailed(String),
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::NotConnected => write!(f, "Not connected to display"),
            WindowError::QueryFailed(msg) => write!(f, "Query failed: {}", msg),
            WindowError::GrabFailed(msg) => write!(f, "Grab failed: {}", msg),
        }
    }
}

impl std::error::Error for WindowError {}

/// Trait for window system backends
///
/// Implementations answer window-tree and property queries and register
/// key grabs. The X11 implementation lives in `crate::x11`; tests use
/// `crate::testing::FakeWindowSystem`.
pub trait WindowSystem: Send {
    /// The root window of the screen
    fn root(&self) -> WindowId;

    /// Class part of the window's class hint, if it has one
    fn class_hint(&self, window: WindowId) -> Result<Option<String>, WindowError>;

    /// Parent of a window (`None` for the root)
    fn parent(&self, window: WindowId) -> Result<Option<WindowId>, WindowError>;

    /// Direct children of a window
    fn children(&self, window: WindowId) -> Result<Vec<WindowId>, WindowError>;

    /// The window that currently has focus
    fn focused_window(&self) -> Result<Option<WindowId>, WindowError>;

    /// Windows that should receive grabs at startup.
    ///
    /// Defaults to every window below the root.
    fn top_level_windows(&self) -> Result<Vec<WindowId>, WindowError> {
        super::tree::descendants(self, self.root())
    }

    /// Register interest in `key` with exactly `modifiers` held, scoped to `window`
    fn grab_key(&self, window: WindowId, key: Key, modifiers: u16) -> Result<(), WindowError>;
}
