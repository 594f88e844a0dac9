// Appkeys Event Loop
// Single consumer that dispatches source notifications into the remapper

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{EventSource, SourceControl, SourceError};
use crate::remapper::Remapper;

/// Result type for event loop operations
pub type EventLoopResult<T> = Result<T, EventLoopError>;

/// Errors that can occur in the event loop
#[derive(Debug, thiserror::Error)]
pub enum EventLoopError {
    #[error("Event source error: {0}")]
    Source(#[from] SourceError),
}

/// Shared stop flag, set once by the shutdown path
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Dispatches every notification from a source into the shared context.
///
/// Each notification is handled with the context lock held, so the shutdown
/// path can wait for an in-flight dispatch by taking the same lock.
pub struct EventLoop {
    context: Arc<Mutex<Remapper>>,
    token: CancellationToken,
    dispatched: u64,
}

impl EventLoop {
    pub fn new(context: Arc<Mutex<Remapper>>, token: CancellationToken) -> Self {
        Self {
            context,
            token,
            dispatched: 0,
        }
    }

    /// Notifications dispatched so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Run until the source ends or the token is cancelled
    pub fn run<S: EventSource + ?Sized>(&mut self, source: &mut S) -> EventLoopResult<()> {
        if self.token.is_cancelled() {
            return Ok(());
        }

        let context = &self.context;
        let token = &self.token;
        let dispatched = &mut self.dispatched;

        source.run(&mut |event| {
            if token.is_cancelled() {
                return ControlFlow::Break(());
            }
            let mut remapper = context.lock();
            log::trace!("Dispatching {:?}", event);
            remapper.dispatch(event);
            *dispatched += 1;
            ControlFlow::Continue(())
        })?;

        log::debug!("Event loop finished after {} notification(s)", self.dispatched);
        Ok(())
    }
}

/// Stop the event loop from another thread.
///
/// Cancels `token`, waits for any in-flight dispatch by taking the context
/// lock, flushes pending output and stops the source.
pub fn shutdown(
    token: &CancellationToken,
    context: &Mutex<Remapper>,
    control: &dyn SourceControl,
) -> Result<(), SourceError> {
    token.cancel();
    let mut remapper = context.lock();
    if let Err(e) = remapper.flush_output() {
        log::warn!("Could not flush output during shutdown: {}", e);
    }
    control.stop()
}
