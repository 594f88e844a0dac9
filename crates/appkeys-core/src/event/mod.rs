// Appkeys Event Handling
// Input notifications, the sources that produce them, and the dispatch loop

pub mod r#loop;

use std::ops::ControlFlow;

use crate::window::WindowId;
use crate::Key;

pub use r#loop::{shutdown, CancellationToken, EventLoop, EventLoopError, EventLoopResult};

/// One notification from the input source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress(Key),
    KeyRelease(Key),
    /// Raw button detail (1 = left, 2 = middle, 3 = right, ...)
    ButtonPress(u8),
    ButtonRelease(u8),
    WindowCreated(WindowId),
    WindowDestroyed(WindowId),
}

/// Error type for event sources
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Event source failed: {0}")]
    Failed(String),

    #[error("Could not stop event source: {0}")]
    Stop(String),
}

/// A blocking producer of input notifications.
///
/// `run` delivers events to `handler` until the handler breaks, the source is
/// stopped through its `SourceControl`, or the source fails.
pub trait EventSource {
    fn run(
        &mut self,
        handler: &mut dyn FnMut(InputEvent) -> ControlFlow<()>,
    ) -> Result<(), SourceError>;
}

/// Handle that stops a running `EventSource` from another thread
pub trait SourceControl: Send + Sync {
    fn stop(&self) -> Result<(), SourceError>;
}
