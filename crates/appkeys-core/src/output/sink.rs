// Appkeys Output Sink
// Interface for synthesizing input events back into the window system

use crate::hotkey::Button;
use crate::Key;

/// A single synthetic input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticEvent {
    Key { key: Key, pressed: bool },
    Button { button: Button, pressed: bool },
}

/// Error types for output operations
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to send synthetic event: {0}")]
    Send(String),

    #[error("Failed to flush output: {0}")]
    Flush(String),

    #[error("Output not connected")]
    NotConnected,
}

/// Destination for synthetic input events
pub trait EventSink: Send {
    /// Synthesize a key press or release
    fn key(&mut self, key: Key, pressed: bool) -> Result<(), OutputError>;

    /// Synthesize a mouse button press or release
    fn button(&mut self, button: Button, pressed: bool) -> Result<(), OutputError>;

    /// While suspended, synthetic events must not be treated as real input
    /// by other grabs
    fn set_passthrough_suspended(&mut self, suspended: bool) -> Result<(), OutputError>;

    /// Push everything queued so far to the server
    fn flush(&mut self) -> Result<(), OutputError>;

    /// Synthesize one event
    fn emit(&mut self, event: SyntheticEvent) -> Result<(), OutputError> {
        match event {
            SyntheticEvent::Key { key, pressed } => self.key(key, pressed),
            SyntheticEvent::Button { button, pressed } => self.button(button, pressed),
        }
    }

    /// Synthesize a batch of events, then flush
    fn emit_all(&mut self, events: &[SyntheticEvent]) -> Result<(), OutputError> {
        for event in events {
            self.emit(*event)?;
        }
        self.flush()
    }
}
